//! Album -> songs index.
//!
//! Songs are grouped by their release-group id. Buckets keep the relative
//! order the songs had in the input; callers that want track order sort a
//! bucket explicitly with [`crate::classify::sort_songs_by_position`].

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::hash_map::Entry;

use crate::models::{Album, Song};

/// Mapping from album id to the songs that reference it.
///
/// Borrows from the loaded song collection; it owns no records.
#[derive(Clone, Debug, Default)]
pub struct AlbumSongIndex<'a> {
    buckets: FxHashMap<&'a str, Vec<&'a Song>>,
    /// Keys in first-seen order, so iteration is deterministic.
    order: Vec<&'a str>,
}

impl<'a> AlbumSongIndex<'a> {
    fn insert(&mut self, album_id: &'a str, song: &'a Song) {
        match self.buckets.entry(album_id) {
            Entry::Occupied(mut bucket) => bucket.get_mut().push(song),
            Entry::Vacant(slot) => {
                self.order.push(album_id);
                slot.insert(vec![song]);
            }
        }
    }

    /// Songs for an album, in input order. Unknown ids yield an empty slice.
    pub fn songs_for(&self, album_id: &str) -> &[&'a Song] {
        self.buckets
            .get(album_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn song_count(&self, album_id: &str) -> usize {
        self.songs_for(album_id).len()
    }

    pub fn contains(&self, album_id: &str) -> bool {
        self.buckets.contains_key(album_id)
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of songs across all buckets.
    pub fn indexed_song_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Buckets in the order their album id was first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Song])> + '_ {
        self.order
            .iter()
            .map(move |&id| (id, self.songs_for(id)))
    }
}

/// Group songs by release-group id.
/// Songs without a release-group id are left out of every bucket.
pub fn build_index(songs: &[Song]) -> AlbumSongIndex<'_> {
    let mut index = AlbumSongIndex::default();
    for song in songs {
        if let Some(album_id) = song.release_group_id.as_deref() {
            index.insert(album_id, song);
        }
    }
    index
}

/// Group songs by release-group id, keeping only ids present in `albums`.
/// Songs pointing at an unknown album land in no bucket.
pub fn build_index_for<'a>(albums: &[Album], songs: &'a [Song]) -> AlbumSongIndex<'a> {
    let known: FxHashSet<&str> = albums.iter().map(|a| a.id.as_str()).collect();
    let mut index = AlbumSongIndex::default();
    let mut dangling = 0usize;
    for song in songs {
        let Some(album_id) = song.release_group_id.as_deref() else {
            continue;
        };
        if known.contains(album_id) {
            index.insert(album_id, song);
        } else {
            dangling += 1;
        }
    }
    if dangling > 0 {
        tracing::debug!(dangling, "songs reference albums missing from the collection");
    }
    index
}

/// Songs whose release-group id names no album in `albums`.
/// Songs without any release-group id are not dangling.
pub fn dangling_songs<'a>(albums: &[Album], songs: &'a [Song]) -> Vec<&'a Song> {
    let known: FxHashSet<&str> = albums.iter().map(|a| a.id.as_str()).collect();
    songs
        .iter()
        .filter(|s| {
            s.release_group_id
                .as_deref()
                .is_some_and(|id| !known.contains(id))
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: &str) -> Album {
        Album {
            id: id.to_string(),
            title: id.to_uppercase(),
            first_release_date: None,
            album_types: Vec::new(),
            secondary_types: Vec::new(),
        }
    }

    fn song(id: &str, album_id: Option<&str>) -> Song {
        Song {
            id: id.to_string(),
            title: id.to_string(),
            duration_ms: None,
            disc_number: 1,
            position: None,
            release_group_id: album_id.map(str::to_string),
        }
    }

    fn fixture() -> (Vec<Album>, Vec<Song>) {
        let albums = vec![album("fearless"), album("red")];
        let songs = vec![
            song("s1", Some("red")),
            song("s2", Some("fearless")),
            song("s3", None),
            song("s4", Some("red")),
            song("s5", Some("missing")),
            song("s6", Some("fearless")),
        ];
        (albums, songs)
    }

    fn ids(songs: &[&Song]) -> Vec<String> {
        songs.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_build_index_groups_stably() {
        let (_, songs) = fixture();
        let index = build_index(&songs);
        assert_eq!(ids(index.songs_for("red")), vec!["s1", "s4"]);
        assert_eq!(ids(index.songs_for("fearless")), vec!["s2", "s6"]);
        assert_eq!(ids(index.songs_for("missing")), vec!["s5"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.indexed_song_count(), 5);
    }

    #[test]
    fn test_build_index_iterates_in_first_seen_order() {
        let (_, songs) = fixture();
        let index = build_index(&songs);
        let keys: Vec<&str> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(keys, vec!["red", "fearless", "missing"]);
    }

    #[test]
    fn test_songs_without_release_group_are_excluded() {
        let (_, songs) = fixture();
        let index = build_index(&songs);
        let in_any = index.iter().any(|(_, bucket)| bucket.iter().any(|s| s.id == "s3"));
        assert!(!in_any);
    }

    #[test]
    fn test_build_index_for_drops_dangling() {
        let (albums, songs) = fixture();
        let index = build_index_for(&albums, &songs);
        assert!(!index.contains("missing"));
        assert_eq!(index.song_count("missing"), 0);
        let in_any = index.iter().any(|(_, bucket)| bucket.iter().any(|s| s.id == "s5"));
        assert!(!in_any);
        assert_eq!(ids(&dangling_songs(&albums, &songs)), vec!["s5"]);
    }

    #[test]
    fn test_every_resolvable_song_in_exactly_one_bucket() {
        let (albums, songs) = fixture();
        let index = build_index_for(&albums, &songs);
        for s in songs.iter().filter(|s| s.id != "s3" && s.id != "s5") {
            let hits: Vec<&str> = index
                .iter()
                .filter(|(_, bucket)| bucket.iter().any(|b| b.id == s.id))
                .map(|(id, _)| id)
                .collect();
            assert_eq!(hits, vec![s.release_group_id.as_deref().unwrap()]);
        }
    }

    #[test]
    fn test_every_bucket_matches_its_key() {
        let (albums, songs) = fixture();
        let index = build_index_for(&albums, &songs);
        for (id, bucket) in index.iter() {
            assert!(bucket.iter().all(|s| s.release_group_id.as_deref() == Some(id)));
        }
    }

    #[test]
    fn test_flatten_round_trip() {
        let (albums, songs) = fixture();
        let index = build_index_for(&albums, &songs);
        let mut flattened: Vec<String> = index
            .iter()
            .flat_map(|(_, bucket)| bucket.iter().map(|s| s.id.clone()))
            .collect();
        flattened.sort();
        assert_eq!(flattened, vec!["s1", "s2", "s4", "s6"]);
    }

    #[test]
    fn test_empty_input() {
        let index = build_index(&[]);
        assert!(index.is_empty());
        assert!(index.songs_for("anything").is_empty());
    }
}
