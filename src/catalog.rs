//! Load -> index -> classify composition used by every report.
//!
//! A [`Catalog`] borrows the loaded album and song collections, builds the
//! album index once and classifies every album once. All queries return
//! views into that precomputed state; nothing is mutated after construction.

use rustc_hash::FxHashSet;

use crate::classify::{sort_by_release_date, sort_songs_by_position, ClassifierConfig};
use crate::error::CatalogResult;
use crate::index::{build_index_for, dangling_songs, AlbumSongIndex};
use crate::models::{Album, CatalogStats, ClassifiedAlbum, Era, EraSummary, Song};
use crate::normalize::release_year;

pub struct Catalog<'a> {
    albums: &'a [Album],
    songs: &'a [Song],
    index: AlbumSongIndex<'a>,
    /// One entry per album, in input order. Songs are in disc/track order.
    classified: Vec<ClassifiedAlbum<'a>>,
}

impl<'a> Catalog<'a> {
    /// Build a catalog with the built-in era table and marker.
    pub fn new(albums: &'a [Album], songs: &'a [Song]) -> Self {
        Self::build(albums, songs, &ClassifierConfig::default())
    }

    pub fn with_config(
        albums: &'a [Album],
        songs: &'a [Song],
        config: &ClassifierConfig,
    ) -> CatalogResult<Self> {
        config.validate()?;
        Ok(Self::build(albums, songs, config))
    }

    fn build(albums: &'a [Album], songs: &'a [Song], config: &ClassifierConfig) -> Self {
        let index = build_index_for(albums, songs);
        let classified = albums
            .iter()
            .map(|album| {
                let mut bucket = index.songs_for(&album.id).to_vec();
                sort_songs_by_position(&mut bucket);
                config.classify_album(album, bucket)
            })
            .collect();
        let catalog = Self {
            albums,
            songs,
            index,
            classified,
        };
        catalog.stats().log_phase("catalog");
        catalog
    }

    pub fn albums(&self) -> &'a [Album] {
        self.albums
    }

    pub fn songs(&self) -> &'a [Song] {
        self.songs
    }

    pub fn index(&self) -> &AlbumSongIndex<'a> {
        &self.index
    }

    /// Every album with its derived fields, in input order.
    pub fn classified(&self) -> &[ClassifiedAlbum<'a>] {
        &self.classified
    }

    /// Albums released in `[start_year, end_year]` (inclusive), sorted by
    /// release date.
    pub fn albums_in_range(&self, start_year: i32, end_year: i32) -> Vec<&ClassifiedAlbum<'a>> {
        self.sorted_where(|c| {
            c.album
                .release_date()
                .and_then(release_year)
                .is_some_and(|year| year >= start_year && year <= end_year)
        })
    }

    /// Albums classified into `era`, sorted by release date.
    pub fn albums_in_era(&self, era: Era) -> Vec<&ClassifiedAlbum<'a>> {
        self.sorted_where(|c| c.era == era)
    }

    fn sorted_where<F>(&self, keep: F) -> Vec<&ClassifiedAlbum<'a>>
    where
        F: Fn(&ClassifiedAlbum<'a>) -> bool,
    {
        let mut kept: Vec<&ClassifiedAlbum<'a>> =
            self.classified.iter().filter(|c| keep(c)).collect();
        sort_by_release_date(&mut kept);
        kept
    }

    /// First album whose title matches exactly.
    pub fn find_by_title(&self, title: &str) -> Option<&ClassifiedAlbum<'a>> {
        self.classified.iter().find(|c| c.album.title == title)
    }

    pub fn era_summary(&self, era: Era) -> EraSummary {
        let members: Vec<&ClassifiedAlbum<'a>> =
            self.classified.iter().filter(|c| c.era == era).collect();
        let unique_songs: FxHashSet<&str> = members
            .iter()
            .flat_map(|c| c.songs.iter().map(|s| s.id.as_str()))
            .collect();
        EraSummary {
            era,
            album_count: members.len(),
            unique_song_count: unique_songs.len(),
            album_ids: members.iter().map(|c| c.album.id.clone()).collect(),
        }
    }

    /// Summaries for every era with at least one album, chronological with
    /// `Unknown` last.
    pub fn era_summaries(&self) -> Vec<EraSummary> {
        Era::ALL
            .iter()
            .map(|&era| self.era_summary(era))
            .filter(|summary| summary.album_count > 0)
            .collect()
    }

    /// Songs referencing an album that is not in the collection.
    pub fn dangling_songs(&self) -> Vec<&'a Song> {
        dangling_songs(self.albums, self.songs)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            albums: self.albums.len(),
            songs: self.songs.len(),
            indexed_songs: self.index.indexed_song_count(),
            dangling_songs: self.dangling_songs().len(),
            songs_without_release_group: self
                .songs
                .iter()
                .filter(|s| s.release_group_id.is_none())
                .count(),
            albums_unknown_era: self
                .classified
                .iter()
                .filter(|c| c.era == Era::Unknown)
                .count(),
            albums_without_release_date: self
                .albums
                .iter()
                .filter(|a| a.release_date().is_none())
                .count(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
