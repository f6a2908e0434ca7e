//! Search query composition.
//!
//! [`AssetQuery::build`] turns optional [`SearchCriteria`] into a set of
//! independent predicates combined with AND plus exactly one sort order.
//! Each predicate builder owns its own edge-case policy (minimum pattern
//! length, case normalization) so they can be tested in isolation.
//!
//! The same query value is evaluated in memory ([`AssetQuery::apply`]) and
//! translated to SQL by the database adapter.
//!
//! Upload date is the only sort key. Records with equal upload dates have no
//! defined relative order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Filename patterns shorter than this (in characters) are ignored.
pub const MIN_FILENAME_PATTERN_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Sort direction over upload date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// Optional filter/sort request. Every field is independently optional;
/// `None` means "no constraint on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub upload_date_start: Option<Timestamp>,
    pub upload_date_end: Option<Timestamp>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Inclusive upload-date range; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    pub fn contains(&self, instant: Timestamp) -> bool {
        self.start.map_or(true, |start| instant >= start)
            && self.end.map_or(true, |end| instant <= end)
    }
}

/// A single predicate over asset records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetFilter {
    /// Upload date within the (possibly one-sided) closed range.
    UploadDate(DateRange),
    /// Case-insensitive substring of the filename. Holds the lowercased pattern.
    FilenameContains(String),
    /// Exact content type. Holds the lowercased value.
    ContentTypeEquals(String),
}

impl AssetFilter {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            AssetFilter::UploadDate(range) => range.contains(asset.upload_date()),
            AssetFilter::FilenameContains(pattern) => asset
                .filename()
                .as_str()
                .to_lowercase()
                .contains(pattern.as_str()),
            AssetFilter::ContentTypeEquals(content_type) => {
                asset.content_type().as_str() == content_type
            }
        }
    }
}

/// Upload-date range predicate. Returns `None` when neither bound is set.
///
/// An end before the start is kept as-is and matches nothing.
pub fn upload_date_range(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<AssetFilter> {
    if start.is_none() && end.is_none() {
        return None;
    }
    Some(AssetFilter::UploadDate(DateRange { start, end }))
}

/// Filename substring predicate.
///
/// Returns `None` (no filter) when the pattern is absent, blank, shorter
/// than [`MIN_FILENAME_PATTERN_LEN`] characters, or has no alphanumeric
/// character at all.
pub fn filename_matches(pattern: Option<&str>) -> Option<AssetFilter> {
    let pattern = pattern?;
    if pattern.trim().is_empty()
        || pattern.chars().count() < MIN_FILENAME_PATTERN_LEN
        || !pattern.chars().any(char::is_alphanumeric)
    {
        return None;
    }
    Some(AssetFilter::FilenameContains(pattern.to_lowercase()))
}

/// Content-type equality predicate. Returns `None` when absent or blank.
pub fn content_type_equals(content_type: Option<&str>) -> Option<AssetFilter> {
    let content_type = content_type?;
    if content_type.trim().is_empty() {
        return None;
    }
    Some(AssetFilter::ContentTypeEquals(content_type.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Composed query: all filters AND-ed together, sorted by upload date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    filters: Vec<AssetFilter>,
    sort: SortDirection,
}

impl AssetQuery {
    /// Build a query from criteria. Empty criteria yield no filters and the
    /// default ascending sort.
    pub fn build(criteria: &SearchCriteria) -> Self {
        let filters = [
            upload_date_range(criteria.upload_date_start, criteria.upload_date_end),
            filename_matches(criteria.filename.as_deref()),
            content_type_equals(criteria.content_type.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            filters,
            sort: criteria.sort_direction.unwrap_or_default(),
        }
    }

    pub fn filters(&self) -> &[AssetFilter] {
        &self.filters
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort
    }

    /// True when every filter accepts the asset.
    pub fn matches(&self, asset: &Asset) -> bool {
        self.filters.iter().all(|filter| filter.matches(asset))
    }

    /// Order two assets according to the query's sort.
    pub fn compare(&self, a: &Asset, b: &Asset) -> Ordering {
        let ordering = a.upload_date().cmp(&b.upload_date());
        match self.sort {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Filter and sort an in-memory collection.
    pub fn apply<I>(&self, assets: I) -> Vec<Asset>
    where
        I: IntoIterator<Item = Asset>,
    {
        let mut matched: Vec<Asset> = assets.into_iter().filter(|a| self.matches(a)).collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::asset::{AssetId, ContentType, FileSize, Filename};

    fn at(hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2018, 5, 5, hour, minute, 0).unwrap()
    }

    fn asset(id: &str, filename: &str, content_type: &str, uploaded: Timestamp) -> Asset {
        Asset::pending(
            AssetId::new(id),
            Filename::new(filename),
            ContentType::new(content_type),
            FileSize::from(1),
            uploaded,
        )
    }

    fn fixtures() -> Vec<Asset> {
        vec![
            asset("3", "Panda bear.gif", "image/gif", at(12, 15)),
            asset("1", "rauw, alejandro.png", "image/png", at(11, 45)),
            asset("2", "tokio de paris.png", "image/png", at(12, 0)),
        ]
    }

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.id().as_str()).collect()
    }

    // -- upload_date_range ---------------------------------------------------

    #[test]
    fn date_range_absent_is_no_filter() {
        assert_eq!(upload_date_range(None, None), None);
    }

    #[test]
    fn date_range_closed_interval_is_inclusive() {
        let filter = upload_date_range(Some(at(11, 45)), Some(at(12, 0))).unwrap();
        assert!(filter.matches(&asset("a", "x.png", "image/png", at(11, 45))));
        assert!(filter.matches(&asset("a", "x.png", "image/png", at(12, 0))));
        assert!(!filter.matches(&asset("a", "x.png", "image/png", at(12, 15))));
    }

    #[test]
    fn date_range_start_only_is_lower_bound() {
        let filter = upload_date_range(Some(at(12, 0)), None).unwrap();
        assert!(!filter.matches(&asset("a", "x.png", "image/png", at(11, 45))));
        assert!(filter.matches(&asset("a", "x.png", "image/png", at(23, 0))));
    }

    #[test]
    fn date_range_end_only_is_upper_bound() {
        let filter = upload_date_range(None, Some(at(12, 0))).unwrap();
        assert!(filter.matches(&asset("a", "x.png", "image/png", at(0, 0))));
        assert!(!filter.matches(&asset("a", "x.png", "image/png", at(12, 1))));
    }

    #[test]
    fn date_range_inverted_matches_nothing() {
        let query = AssetQuery::build(&SearchCriteria {
            upload_date_start: Some(at(12, 15)),
            upload_date_end: Some(at(11, 45)),
            ..Default::default()
        });
        assert!(query.apply(fixtures()).is_empty());
    }

    // -- filename_matches ----------------------------------------------------

    #[test]
    fn filename_short_blank_or_punctuation_is_no_filter() {
        for pattern in ["", "a", "..", "       ", "...", "-_-"] {
            assert_eq!(filename_matches(Some(pattern)), None, "pattern {pattern:?}");
        }
        assert_eq!(filename_matches(None), None);
    }

    #[test]
    fn filename_pattern_is_lowercased() {
        assert_matches!(
            filename_matches(Some("PaNdA")),
            Some(AssetFilter::FilenameContains(p)) if p == "panda"
        );
    }

    #[test]
    fn filename_substring_is_case_insensitive() {
        for (pattern, expected) in [
            ("e p", vec!["2"]),
            ("rauw,", vec!["1"]),
            ("TOKIO", vec!["2"]),
            ("PANDA", vec!["3"]),
        ] {
            let query = AssetQuery::build(&SearchCriteria {
                filename: Some(pattern.to_string()),
                ..Default::default()
            });
            assert_eq!(ids(&query.apply(fixtures())), expected, "pattern {pattern:?}");
        }
    }

    // -- content_type_equals -------------------------------------------------

    #[test]
    fn content_type_blank_is_no_filter() {
        assert_eq!(content_type_equals(Some("  ")), None);
        assert_eq!(content_type_equals(None), None);
    }

    #[test]
    fn content_type_match_is_case_insensitive() {
        for pattern in ["IMAGE/PNG", "image/png", "Image/Png"] {
            let query = AssetQuery::build(&SearchCriteria {
                content_type: Some(pattern.to_string()),
                ..Default::default()
            });
            assert_eq!(ids(&query.apply(fixtures())), vec!["1", "2"]);
        }
    }

    #[test]
    fn content_type_requires_full_match() {
        let query = AssetQuery::build(&SearchCriteria {
            content_type: Some("age/png".to_string()),
            ..Default::default()
        });
        assert!(query.apply(fixtures()).is_empty());
    }

    // -- composition & sort --------------------------------------------------

    #[test]
    fn empty_criteria_has_no_filters_and_sorts_ascending() {
        let query = AssetQuery::build(&SearchCriteria::default());
        assert!(query.filters().is_empty());
        assert_eq!(query.sort_direction(), SortDirection::Asc);
        assert_eq!(ids(&query.apply(fixtures())), vec!["1", "2", "3"]);
    }

    #[test]
    fn descending_sort_is_honoured() {
        let query = AssetQuery::build(&SearchCriteria {
            sort_direction: Some(SortDirection::Desc),
            ..Default::default()
        });
        assert_eq!(ids(&query.apply(fixtures())), vec!["3", "2", "1"]);
    }

    #[test]
    fn filters_combine_with_and() {
        let query = AssetQuery::build(&SearchCriteria {
            upload_date_start: Some(at(11, 50)),
            content_type: Some("image/png".to_string()),
            filename: Some("png".to_string()),
            ..Default::default()
        });
        assert_eq!(query.filters().len(), 3);
        assert_eq!(ids(&query.apply(fixtures())), vec!["2"]);
    }

    #[test]
    fn sort_direction_parses_either_case() {
        let asc: SortDirection = serde_json::from_str("\"ASC\"").unwrap();
        let desc: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(asc, SortDirection::Asc);
        assert_eq!(desc, SortDirection::Desc);
    }
}
