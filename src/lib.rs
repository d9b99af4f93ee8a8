//! Discography join-and-classify engine - shared modules for all reports.

pub mod catalog;
pub mod classify;
pub mod error;
pub mod index;
pub mod load;
pub mod models;
pub mod normalize;

pub use catalog::Catalog;
pub use classify::{
    classify_era, filter_by_date_range, is_alternate_version, sort_by_release_date,
    sort_songs_by_position, ClassifierConfig, EraTable,
};
pub use error::{CatalogError, CatalogResult};
pub use index::{build_index, build_index_for, AlbumSongIndex};
pub use models::{Album, ClassifiedAlbum, Era, Song};
