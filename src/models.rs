//! Core data models for the discography engine.
//!
//! This module contains the album and song records as loaded from the data
//! source, the era labels, and the derived views handed to reporters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Eras
// ============================================================================

/// Named period of the discography, assigned to an album by release year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "Taylor Swift")]
    TaylorSwift,
    #[serde(rename = "Fearless")]
    Fearless,
    #[serde(rename = "Speak Now")]
    SpeakNow,
    #[serde(rename = "Red")]
    Red,
    #[serde(rename = "1989")]
    NineteenEightyNine,
    #[serde(rename = "Reputation")]
    Reputation,
    #[serde(rename = "Lover")]
    Lover,
    #[serde(rename = "Folklore/Evermore")]
    FolkloreEvermore,
    #[serde(rename = "Midnights")]
    Midnights,
    #[serde(rename = "Tortured Poets Department")]
    TorturedPoetsDepartment,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Era {
    /// Every label, in chronological order with `Unknown` last.
    pub const ALL: [Era; 11] = [
        Era::TaylorSwift,
        Era::Fearless,
        Era::SpeakNow,
        Era::Red,
        Era::NineteenEightyNine,
        Era::Reputation,
        Era::Lover,
        Era::FolkloreEvermore,
        Era::Midnights,
        Era::TorturedPoetsDepartment,
        Era::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Era::TaylorSwift => "Taylor Swift",
            Era::Fearless => "Fearless",
            Era::SpeakNow => "Speak Now",
            Era::Red => "Red",
            Era::NineteenEightyNine => "1989",
            Era::Reputation => "Reputation",
            Era::Lover => "Lover",
            Era::FolkloreEvermore => "Folklore/Evermore",
            Era::Midnights => "Midnights",
            Era::TorturedPoetsDepartment => "Tortured Poets Department",
            Era::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Source Records
// ============================================================================

/// Release group (album) as supplied by the data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "first-release-date", default)]
    pub first_release_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album_types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_types: Vec<String>,
}

impl Album {
    /// Release date, with an empty string treated as absent.
    pub fn release_date(&self) -> Option<&str> {
        self.first_release_date
            .as_deref()
            .filter(|date| !date.is_empty())
    }

    pub fn has_secondary_type(&self, tag: &str) -> bool {
        self.secondary_types.iter().any(|t| t == tag)
    }
}

impl AsRef<Album> for Album {
    fn as_ref(&self) -> &Album {
        self
    }
}

/// Song recording as supplied by the data source.
///
/// Field-name variants seen across sources are resolved once, on load:
/// - title: `title`, falling back to `name`
/// - duration: `duration_ms`, falling back to `length`; whole-number floats
///   such as `232106.0` are accepted
/// - disc: `discNumber`, falling back to `disc_number`; default 1
/// - release group: `releaseGroupId`, falling back to `release_group_id`;
///   empty means absent
///
/// A record may carry both spellings of a field; the first one listed wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSong")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub duration_ms: Option<u64>,
    pub disc_number: u32,
    /// `None` is the unknown position; it sorts after every real position.
    pub position: Option<u32>,
    pub release_group_id: Option<String>,
}

impl Song {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}

/// Wire shape of a song before field-name variants are collapsed.
#[derive(Deserialize)]
struct RawSong {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "whole_millis")]
    duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "whole_millis")]
    length: Option<u64>,
    #[serde(default, rename = "discNumber")]
    disc_number_camel: Option<u32>,
    #[serde(default)]
    disc_number: Option<u32>,
    #[serde(default)]
    position: Option<u32>,
    #[serde(default, rename = "releaseGroupId")]
    release_group_id_camel: Option<String>,
    #[serde(default)]
    release_group_id: Option<String>,
}

impl From<RawSong> for Song {
    fn from(raw: RawSong) -> Self {
        Song {
            id: raw.id,
            title: raw.title.or(raw.name).unwrap_or_default(),
            duration_ms: raw.duration_ms.or(raw.length),
            // Discs and positions are 1-based; zero carries no information.
            disc_number: raw
                .disc_number_camel
                .or(raw.disc_number)
                .filter(|&d| d >= 1)
                .unwrap_or(1),
            position: raw.position.filter(|&p| p >= 1),
            release_group_id: raw
                .release_group_id_camel
                .or(raw.release_group_id)
                .filter(|id| !id.is_empty()),
        }
    }
}

/// Millisecond duration as an integer or a float with no fractional part.
fn whole_millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(ms) = number.as_u64() {
        return Ok(Some(ms));
    }
    match number.as_f64() {
        Some(ms) if ms >= 0.0 && ms.fract() == 0.0 && ms <= u64::MAX as f64 => Ok(Some(ms as u64)),
        _ => Err(serde::de::Error::custom(format!(
            "duration {} is not a whole number of milliseconds",
            number
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Derived Views
// ============================================================================

/// Album enriched with its era, alternate-version flag and songs.
/// Computed once per run; borrows from the loaded collections.
#[derive(Clone, Debug, Serialize)]
pub struct ClassifiedAlbum<'a> {
    #[serde(flatten)]
    pub album: &'a Album,
    pub era: Era,
    pub is_alternate_version: bool,
    pub songs: Vec<&'a Song>,
}

impl AsRef<Album> for ClassifiedAlbum<'_> {
    fn as_ref(&self) -> &Album {
        self.album
    }
}

impl ClassifiedAlbum<'_> {
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }
}

/// Per-era aggregate: how many albums fall in the era and how many distinct
/// songs those albums carry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EraSummary {
    pub era: Era,
    pub album_count: usize,
    pub unique_song_count: usize,
    pub album_ids: Vec<String>,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Counts describing one load-and-index run.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub albums: usize,
    pub songs: usize,
    pub indexed_songs: usize,
    pub dangling_songs: usize,
    pub songs_without_release_group: usize,
    pub albums_unknown_era: usize,
    pub albums_without_release_date: usize,
}

impl CatalogStats {
    /// Share of songs that landed in an album bucket, as a percentage.
    pub fn index_rate(&self) -> f64 {
        if self.songs == 0 {
            0.0
        } else {
            100.0 * self.indexed_songs as f64 / self.songs as f64
        }
    }

    /// Log stats in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            tracing::info!(phase, "catalog stats\n{}", json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
