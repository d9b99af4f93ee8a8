//! Era classification, alternate-version detection, filtering and sorting.
//!
//! This module contains:
//! - The era table (year ranges -> era labels) and its configuration
//! - Alternate-version ("Taylor's Version") detection
//! - Date-range filtering of albums
//! - Stable sorts for albums (by release date) and songs (by disc/track)
//!
//! The era table is half-open on each range while the date-range filter is
//! inclusive on both ends. Both behaviours are kept as the reports use them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Album, ClassifiedAlbum, Era, Song};
use crate::normalize::{normalize_apostrophes, release_year};

// ============================================================================
// Era Table
// ============================================================================

/// Marker substring identifying a re-recorded release.
pub const DEFAULT_ALTERNATE_MARKER: &str = "Taylor's Version";

/// One row of the era table: `[start, end)`, open-ended when `end` is None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraRange {
    pub start: i32,
    #[serde(default)]
    pub end: Option<i32>,
    pub era: Era,
}

impl EraRange {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && self.end.map_or(true, |end| year < end)
    }
}

/// Year ranges in ascending order. Years outside every range are `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EraTable {
    ranges: Vec<EraRange>,
}

const fn range(start: i32, end: i32, era: Era) -> EraRange {
    EraRange {
        start,
        end: Some(end),
        era,
    }
}

/// Built-in era table shared by every report.
pub static DEFAULT_ERA_TABLE: Lazy<EraTable> = Lazy::new(|| EraTable {
    ranges: vec![
        range(2006, 2008, Era::TaylorSwift),
        range(2008, 2010, Era::Fearless),
        range(2010, 2012, Era::SpeakNow),
        range(2012, 2014, Era::Red),
        range(2014, 2017, Era::NineteenEightyNine),
        range(2017, 2019, Era::Reputation),
        range(2019, 2020, Era::Lover),
        range(2020, 2022, Era::FolkloreEvermore),
        range(2022, 2024, Era::Midnights),
        EraRange {
            start: 2024,
            end: None,
            era: Era::TorturedPoetsDepartment,
        },
    ],
});

impl EraTable {
    /// Build a table, rejecting empty, inverted, unordered or overlapping ranges.
    pub fn new(ranges: Vec<EraRange>) -> CatalogResult<Self> {
        let table = EraTable { ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn ranges(&self) -> &[EraRange] {
        &self.ranges
    }

    /// Era for a year; the first matching range wins.
    pub fn era_for_year(&self, year: i32) -> Era {
        self.ranges
            .iter()
            .find(|r| r.contains(year))
            .map(|r| r.era)
            .unwrap_or(Era::Unknown)
    }

    /// Era for a `YYYY[-MM[-DD]]` date. Absent, empty or malformed dates
    /// resolve to `Unknown`.
    pub fn classify(&self, release_date: Option<&str>) -> Era {
        let Some(date) = release_date.filter(|d| !d.is_empty()) else {
            return Era::Unknown;
        };
        match release_year(date) {
            Some(year) => self.era_for_year(year),
            None => {
                tracing::debug!(release_date = date, "unparseable release date");
                Era::Unknown
            }
        }
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.ranges.is_empty() {
            return Err(CatalogError::InvalidConfig("era table is empty".into()));
        }
        for (i, r) in self.ranges.iter().enumerate() {
            if r.era == Era::Unknown {
                return Err(CatalogError::InvalidConfig(format!(
                    "range {} maps to Unknown",
                    i
                )));
            }
            if let Some(end) = r.end {
                if end <= r.start {
                    return Err(CatalogError::InvalidConfig(format!(
                        "range {} ends ({}) at or before its start ({})",
                        i, end, r.start
                    )));
                }
            }
            if let Some(next) = self.ranges.get(i + 1) {
                match r.end {
                    None => {
                        return Err(CatalogError::InvalidConfig(format!(
                            "open-ended range {} must be last",
                            i
                        )))
                    }
                    Some(end) if next.start < end => {
                        return Err(CatalogError::InvalidConfig(format!(
                            "range {} overlaps or precedes range {}",
                            i + 1,
                            i
                        )))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

impl Default for EraTable {
    fn default() -> Self {
        DEFAULT_ERA_TABLE.clone()
    }
}

// ============================================================================
// Classifier Config
// ============================================================================

/// Configuration shared by every classification call: the era table and the
/// alternate-version marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub eras: EraTable,
    pub alternate_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            eras: EraTable::default(),
            alternate_marker: DEFAULT_ALTERNATE_MARKER.to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Load a config from JSON. Missing keys fall back to the defaults.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if normalize_apostrophes(&self.alternate_marker).is_empty() {
            return Err(CatalogError::InvalidConfig(
                "alternate marker is empty".into(),
            ));
        }
        self.eras.validate()
    }

    pub fn classify_era(&self, release_date: Option<&str>) -> Era {
        self.eras.classify(release_date)
    }

    pub fn is_alternate_version(&self, title: &str) -> bool {
        let marker = normalize_apostrophes(&self.alternate_marker);
        !marker.is_empty() && normalize_apostrophes(title).contains(&marker)
    }

    /// Attach era, alternate-version flag and songs to an album.
    pub fn classify_album<'a>(&self, album: &'a Album, songs: Vec<&'a Song>) -> ClassifiedAlbum<'a> {
        ClassifiedAlbum {
            album,
            era: self.classify_era(album.release_date()),
            is_alternate_version: self.is_alternate_version(&album.title),
            songs,
        }
    }
}

// ============================================================================
// Classification (default config)
// ============================================================================

/// Era for a release date using the built-in table.
pub fn classify_era(release_date: Option<&str>) -> Era {
    DEFAULT_ERA_TABLE.classify(release_date)
}

/// True if the title carries the default re-recording marker, with
/// apostrophe variants treated as equal. Case-sensitive otherwise.
pub fn is_alternate_version(title: &str) -> bool {
    static MARKER: Lazy<String> = Lazy::new(|| normalize_apostrophes(DEFAULT_ALTERNATE_MARKER));
    normalize_apostrophes(title).contains(MARKER.as_str())
}

// ============================================================================
// Filtering and Sorting
// ============================================================================

/// Albums released between `start_year` and `end_year`, both inclusive, in
/// input order. Albums with an absent or unparseable date never match.
pub fn filter_by_date_range(albums: &[Album], start_year: i32, end_year: i32) -> Vec<&Album> {
    albums
        .iter()
        .filter(|album| {
            album
                .release_date()
                .and_then(release_year)
                .is_some_and(|year| year >= start_year && year <= end_year)
        })
        .collect()
}

/// Stable ascending sort by the raw release-date string; a missing date sorts
/// as the empty string, i.e. first.
pub fn sort_by_release_date<T: AsRef<Album>>(albums: &mut [T]) {
    albums.sort_by(|a, b| {
        let a = a.as_ref().first_release_date.as_deref().unwrap_or("");
        let b = b.as_ref().first_release_date.as_deref().unwrap_or("");
        a.cmp(b)
    });
}

/// Stable ascending sort by `(disc, position)`; unknown positions go last
/// within their disc.
pub fn sort_songs_by_position(songs: &mut [&Song]) {
    songs.sort_by_key(|s| (s.disc_number, s.position.is_none(), s.position));
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: &str, title: &str, date: Option<&str>) -> Album {
        Album {
            id: id.to_string(),
            title: title.to_string(),
            first_release_date: date.map(str::to_string),
            album_types: vec!["Album".to_string()],
            secondary_types: Vec::new(),
        }
    }

    fn song(id: &str, disc: u32, position: Option<u32>) -> Song {
        Song {
            id: id.to_string(),
            title: id.to_string(),
            duration_ms: None,
            disc_number: disc,
            position,
            release_group_id: Some("rg".to_string()),
        }
    }

    #[test]
    fn test_classify_era_boundaries() {
        assert_eq!(classify_era(Some("2008-01-01")), Era::Fearless);
        assert_eq!(classify_era(Some("2007-12-31")), Era::TaylorSwift);
        assert_eq!(classify_era(Some("2006")), Era::TaylorSwift);
        assert_eq!(classify_era(Some("2005-12-31")), Era::Unknown);
        assert_eq!(classify_era(Some("2014-10-27")), Era::NineteenEightyNine);
        assert_eq!(classify_era(Some("2016")), Era::NineteenEightyNine);
        assert_eq!(classify_era(Some("2019-08")), Era::Lover);
        assert_eq!(classify_era(Some("2020-07-24")), Era::FolkloreEvermore);
        assert_eq!(classify_era(Some("2021-12-10")), Era::FolkloreEvermore);
        assert_eq!(classify_era(Some("2023-10-27")), Era::Midnights);
        assert_eq!(classify_era(Some("2024-04-19")), Era::TorturedPoetsDepartment);
        assert_eq!(classify_era(Some("2031")), Era::TorturedPoetsDepartment);
    }

    #[test]
    fn test_classify_era_unknown_inputs() {
        assert_eq!(classify_era(None), Era::Unknown);
        assert_eq!(classify_era(Some("")), Era::Unknown);
        assert_eq!(classify_era(Some("99")), Era::Unknown);
        assert_eq!(classify_era(Some("abcd")), Era::Unknown);
        assert_eq!(classify_era(Some("0000-01-01")), Era::Unknown);
    }

    #[test]
    fn test_classify_era_is_total_and_idempotent() {
        let inputs = ["", "2", "20", "200", "2006", "2010-05", "x2010", "1999", "9999", "２０１０"];
        for input in inputs {
            let first = classify_era(Some(input));
            assert!(Era::ALL.contains(&first));
            assert_eq!(first, classify_era(Some(input)));
        }
    }

    #[test]
    fn test_every_era_reachable() {
        let mut seen: Vec<Era> = (2000..2030).map(|y| DEFAULT_ERA_TABLE.era_for_year(y)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen, Era::ALL.to_vec());
    }

    #[test]
    fn test_is_alternate_version() {
        assert!(is_alternate_version("Fearless (Taylor's Version)"));
        assert!(is_alternate_version("Fearless (Taylor’s Version)"));
        assert!(!is_alternate_version("Fearless"));
        assert!(!is_alternate_version("Fearless (taylor's version)"));
    }

    #[test]
    fn test_custom_marker_normalized() {
        let config = ClassifierConfig {
            alternate_marker: "Taylor’s Version".to_string(),
            ..Default::default()
        };
        assert!(config.is_alternate_version("Red (Taylor's Version)"));
        assert!(config.is_alternate_version("Red (Taylor’s Version)"));
        assert!(!config.is_alternate_version("Red"));
    }

    #[test]
    fn test_filter_by_date_range_inclusive() {
        let albums = vec![
            album("a2005", "A", Some("2005-01-01")),
            album("a2006", "B", Some("2006-10-24")),
            album("a2007", "C", Some("2007")),
            album("a2008", "D", Some("2008-11-11")),
            album("a2009", "E", Some("2009-03")),
        ];
        let ids: Vec<&str> = filter_by_date_range(&albums, 2006, 2008)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a2006", "a2007", "a2008"]);
    }

    #[test]
    fn test_filter_by_date_range_excludes_missing_dates() {
        let albums = vec![
            album("none", "A", None),
            album("empty", "B", Some("")),
            album("junk", "C", Some("soon")),
            album("ok", "D", Some("2007-06")),
        ];
        let ids: Vec<&str> = filter_by_date_range(&albums, 0, 9999)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_sort_by_release_date() {
        let albums = vec![
            album("b", "B", Some("2008-11-11")),
            album("none", "N", None),
            album("a", "A", Some("2006-10-24")),
            album("c", "C", Some("2008")),
            album("d", "D", Some("2008-11-11")),
        ];
        let mut refs: Vec<&Album> = albums.iter().collect();
        sort_by_release_date(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["none", "a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_songs_by_position() {
        let songs = vec![song("d2p1", 2, Some(1)), song("d1p3", 1, Some(3)), song("d1p1", 1, Some(1))];
        let mut refs: Vec<&Song> = songs.iter().collect();
        sort_songs_by_position(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["d1p1", "d1p3", "d2p1"]);
    }

    #[test]
    fn test_sort_songs_unknown_position_last_within_disc() {
        let songs = vec![
            song("d2?", 2, None),
            song("d1?a", 1, None),
            song("d1p2", 1, Some(2)),
            song("d1?b", 1, None),
            song("d2p1", 2, Some(1)),
            song("d1max", 1, Some(u32::MAX)),
        ];
        let mut refs: Vec<&Song> = songs.iter().collect();
        sort_songs_by_position(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["d1p2", "d1max", "d1?a", "d1?b", "d2p1", "d2?"]);
    }

    #[test]
    fn test_classify_album() {
        let config = ClassifierConfig::default();
        let a = album("rg", "Speak Now (Taylor’s Version)", Some("2023-07-07"));
        let songs = vec![song("s1", 1, Some(1))];
        let classified = config.classify_album(&a, songs.iter().collect());
        assert_eq!(classified.era, Era::Midnights);
        assert!(classified.is_alternate_version);
        assert_eq!(classified.song_count(), 1);

        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["era"], "Midnights");
        assert_eq!(json["first-release-date"], "2023-07-07");
        assert_eq!(json["songs"][0]["id"], "s1");
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config = ClassifierConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_config_from_json_custom_table() {
        let config = ClassifierConfig::from_json_str(
            r#"{
                "eras": [
                    {"start": 2006, "end": 2009, "era": "Taylor Swift"},
                    {"start": 2009, "era": "Fearless"}
                ],
                "alternate_marker": "Re-Recorded"
            }"#,
        )
        .unwrap();
        assert_eq!(config.classify_era(Some("2008-06")), Era::TaylorSwift);
        assert_eq!(config.classify_era(Some("2015")), Era::Fearless);
        assert!(config.is_alternate_version("Fearless (Re-Recorded)"));
        assert!(!config.is_alternate_version("Fearless (Taylor's Version)"));
    }

    #[test]
    fn test_config_rejects_bad_tables() {
        let overlapping = r#"{"eras": [
            {"start": 2006, "end": 2010, "era": "Taylor Swift"},
            {"start": 2008, "end": 2012, "era": "Fearless"}
        ]}"#;
        assert!(matches!(
            ClassifierConfig::from_json_str(overlapping),
            Err(CatalogError::InvalidConfig(_))
        ));

        let open_not_last = r#"{"eras": [
            {"start": 2006, "era": "Taylor Swift"},
            {"start": 2008, "end": 2012, "era": "Fearless"}
        ]}"#;
        assert!(ClassifierConfig::from_json_str(open_not_last).is_err());

        let inverted = r#"{"eras": [{"start": 2010, "end": 2008, "era": "Red"}]}"#;
        assert!(ClassifierConfig::from_json_str(inverted).is_err());

        assert!(ClassifierConfig::from_json_str(r#"{"eras": []}"#).is_err());
        assert!(ClassifierConfig::from_json_str(r#"{"alternate_marker": ""}"#).is_err());
        assert!(EraTable::new(vec![range(2006, 2008, Era::Unknown)]).is_err());
    }

    #[test]
    fn test_default_table_is_valid() {
        assert!(DEFAULT_ERA_TABLE.validate().is_ok());
        assert_eq!(DEFAULT_ERA_TABLE.ranges().len(), 10);
    }
}
