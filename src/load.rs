//! Decoding the album and song collections.
//!
//! Each collection is a top-level JSON array of objects. Records are decoded
//! one at a time so a failure names the offending record. Any structural
//! problem aborts the whole load; there is no partial result.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::Read;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Album, Song};

const ALBUMS: &str = "albums";
const SONGS: &str = "songs";

fn records_from_value<T: DeserializeOwned>(
    collection: &'static str,
    value: Value,
) -> CatalogResult<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(CatalogError::NotAList { collection });
    };
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(CatalogError::NotAnObject { collection, index });
        }
        let record = serde_json::from_value(item).map_err(|source| CatalogError::InvalidRecord {
            collection,
            index,
            source,
        })?;
        records.push(record);
    }
    tracing::debug!(collection, count = records.len(), "decoded collection");
    Ok(records)
}

pub fn albums_from_value(value: Value) -> CatalogResult<Vec<Album>> {
    records_from_value(ALBUMS, value)
}

pub fn songs_from_value(value: Value) -> CatalogResult<Vec<Song>> {
    records_from_value(SONGS, value)
}

pub fn albums_from_str(json: &str) -> CatalogResult<Vec<Album>> {
    albums_from_value(serde_json::from_str(json)?)
}

pub fn songs_from_str(json: &str) -> CatalogResult<Vec<Song>> {
    songs_from_value(serde_json::from_str(json)?)
}

/// Read failures surface as `Io`, not as malformed input.
fn value_from_reader<R: Read>(reader: R) -> CatalogResult<Value> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            CatalogError::Io(e.into())
        } else {
            CatalogError::Json(e)
        }
    })
}

/// Decode albums from any reader, e.g. a file the caller opened.
pub fn albums_from_reader<R: Read>(reader: R) -> CatalogResult<Vec<Album>> {
    albums_from_value(value_from_reader(reader)?)
}

pub fn songs_from_reader<R: Read>(reader: R) -> CatalogResult<Vec<Song>> {
    songs_from_value(value_from_reader(reader)?)
}

// ============================================================================
// TESTS
// ============================================================================
