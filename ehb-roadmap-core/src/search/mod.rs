//! Fuzzy search over the roadmap dataset.
//!
//! # Scoring
//!
//! Every module, every feature nested in a module, and every timeline event is
//! scored independently against the query:
//!
//! | Component   | Contribution                                              |
//! |-------------|-----------------------------------------------------------|
//! | title       | `fuzzy_match(title, query) × 1.0`                         |
//! | description | `fuzzy_match(description, query) × 0.8`                   |
//! | status      | `0.6` when `filters.status` equals the record's status    |
//! | priority    | `0.4` when `filters.priority` equals the record's priority |
//! | tags        | `0.3 × shared tags / filter tags`                         |
//!
//! Filters add to the score, they never exclude a record. Records scoring at
//! least [`RELEVANCE_THRESHOLD`] are kept, stable-sorted by descending score
//! (ties keep dataset order) and capped at [`MAX_RESULTS`].
//!
//! The `matches` list on each result is computed separately with a plain
//! case-insensitive substring test, so a fuzzy hit may report no matches.

mod fuzzy;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

pub use fuzzy::{fuzzy_match, levenshtein, similarity};

use crate::models::*;

/// Minimum total score for a record to be returned.
pub const RELEVANCE_THRESHOLD: f64 = 0.6;

/// Maximum number of results returned by [`search`].
pub const MAX_RESULTS: usize = 20;

const TITLE_WEIGHT: f64 = 1.0;
const DESCRIPTION_WEIGHT: f64 = 0.8;
const STATUS_WEIGHT: f64 = 0.6;
const PRIORITY_WEIGHT: f64 = 0.4;
const TAGS_WEIGHT: f64 = 0.3;

/// Optional scoring bonuses. Every field is independent; the default is no filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Empty means no tag filter.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Accepted and carried with the request; does not affect scoring.
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.tags.is_empty()
            && self.date_range.is_none()
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }
}

/// One ranked search hit.
///
/// `item` is written untagged; on the way back in, `type` picks its shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub item: SearchableRecord,
    pub score: f64,
    /// Human-readable `"<Field>: <value>"` entries for fields that contain the query.
    pub matches: Vec<String>,
}

impl<'de> Deserialize<'de> for SearchResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "type")]
            kind: RecordKind,
            item: serde_json::Value,
            score: f64,
            #[serde(default)]
            matches: Vec<String>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let item = SearchableRecord::from_value(wire.kind, wire.item).map_err(de::Error::custom)?;
        Ok(Self {
            kind: wire.kind,
            item,
            score: wire.score,
            matches: wire.matches,
        })
    }
}

/// The fields relevance scoring reads from a record.
///
/// Absent optional fields contribute nothing to the score.
pub trait Searchable {
    fn title(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn status(&self) -> Status;
    fn priority(&self) -> Option<Priority>;
    fn tags(&self) -> &BTreeSet<String>;
}

macro_rules! impl_searchable {
    ($($ty:ty),*) => {$(
        impl Searchable for $ty {
            fn title(&self) -> &str {
                &self.title
            }
            fn description(&self) -> Option<&str> {
                self.description.as_deref()
            }
            fn status(&self) -> Status {
                self.status
            }
            fn priority(&self) -> Option<Priority> {
                self.priority
            }
            fn tags(&self) -> &BTreeSet<String> {
                &self.tags
            }
        }
    )*};
}

impl_searchable!(Module, Feature, TimelineEvent);

impl Searchable for SearchableRecord {
    fn title(&self) -> &str {
        SearchableRecord::title(self)
    }
    fn description(&self) -> Option<&str> {
        SearchableRecord::description(self)
    }
    fn status(&self) -> Status {
        SearchableRecord::status(self)
    }
    fn priority(&self) -> Option<Priority> {
        SearchableRecord::priority(self)
    }
    fn tags(&self) -> &BTreeSet<String> {
        SearchableRecord::tags(self)
    }
}

/// Weighted relevance of `record` for `query` under `filters`.
///
/// Always finite and non-negative. The maximum is 4.1 (every component
/// saturated), so scores are only loosely bounded by 1.
pub fn relevance<R: Searchable + ?Sized>(record: &R, query: &str, filters: &SearchFilters) -> f64 {
    let mut score = fuzzy_match(record.title(), query) * TITLE_WEIGHT;

    if let Some(description) = record.description() {
        score += fuzzy_match(description, query) * DESCRIPTION_WEIGHT;
    }

    if filters.status.is_some_and(|s| s == record.status()) {
        score += STATUS_WEIGHT;
    }

    if filters.priority.is_some() && filters.priority == record.priority() {
        score += PRIORITY_WEIGHT;
    }

    if !filters.tags.is_empty() {
        let shared = filters.tags.intersection(record.tags()).count();
        score += TAGS_WEIGHT * shared as f64 / filters.tags.len() as f64;
    }

    score
}

/// Fields of `record` that literally contain `query`, case-insensitively.
///
/// Reported in field order title, description, tags. Tags are reported once,
/// listing all of the record's tags, when any single tag contains the query.
pub fn match_fields<R: Searchable + ?Sized>(record: &R, query: &str) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut matches = Vec::new();

    if record.title().to_lowercase().contains(&needle) {
        matches.push(format!("Title: {}", record.title()));
    }

    if let Some(description) = record.description() {
        if description.to_lowercase().contains(&needle) {
            matches.push(format!("Description: {}", description));
        }
    }

    let tags = record.tags();
    if tags.iter().any(|t| t.to_lowercase().contains(&needle)) {
        let joined: Vec<&str> = tags.iter().map(String::as_str).collect();
        matches.push(format!("Tags: {}", joined.join(", ")));
    }

    matches
}

/// Rank the dataset's modules, features and timeline events against `query`.
///
/// An empty or whitespace-only query returns no results, whatever the filters.
/// The dataset is only read; calling twice with the same inputs yields the
/// same output.
pub fn search(dataset: &Dataset, query: &str, filters: &SearchFilters) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, Candidate<'_>)> = candidates(dataset)
        .map(|c| (c.relevance(query, filters), c))
        .filter(|(score, _)| *score >= RELEVANCE_THRESHOLD)
        .collect();

    // `sort_by` is stable: equal scores keep dataset order.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(MAX_RESULTS);

    let results: Vec<SearchResult> = scored
        .into_iter()
        .map(|(score, candidate)| {
            let item = candidate.to_record();
            SearchResult {
                kind: item.kind(),
                matches: match_fields(&item, query),
                item,
                score,
            }
        })
        .collect();

    tracing::debug!(
        query,
        filtered = !filters.is_empty(),
        candidates = dataset.record_count(),
        hits = results.len(),
        "Roadmap search"
    );

    results
}

/// A borrowed record; only the records that make the cut get cloned.
#[derive(Clone, Copy)]
enum Candidate<'a> {
    Module(&'a Module),
    Feature(&'a Feature),
    Timeline(&'a TimelineEvent),
}

impl Candidate<'_> {
    fn relevance(&self, query: &str, filters: &SearchFilters) -> f64 {
        match self {
            Self::Module(m) => relevance(*m, query, filters),
            Self::Feature(f) => relevance(*f, query, filters),
            Self::Timeline(t) => relevance(*t, query, filters),
        }
    }

    fn to_record(self) -> SearchableRecord {
        match self {
            Self::Module(m) => SearchableRecord::Module(m.clone()),
            Self::Feature(f) => SearchableRecord::Feature(f.clone()),
            Self::Timeline(t) => SearchableRecord::Timeline(t.clone()),
        }
    }
}

/// Every record in dataset order: each module followed by its features, then the timeline.
fn candidates(dataset: &Dataset) -> impl Iterator<Item = Candidate<'_>> {
    dataset
        .modules
        .iter()
        .flat_map(|m| {
            std::iter::once(Candidate::Module(m)).chain(m.features.iter().map(Candidate::Feature))
        })
        .chain(dataset.timeline.iter().map(Candidate::Timeline))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(title: &str, description: Option<&str>, tags: &[&str]) -> Feature {
        Feature {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: description.map(str::to_string),
            status: Status::Planned,
            priority: Some(Priority::High),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn title_substring_contributes_full_weight() {
        let f = feature("Payment Processing", None, &[]);
        let score = relevance(&f, "payment", &SearchFilters::default());
        assert_eq!(score, 1.0);
    }

    #[test]
    fn description_contributes_at_reduced_weight() {
        let f = feature("Ledger", Some("Handles payment settlement"), &[]);
        let score = relevance(&f, "settlement", &SearchFilters::default());
        // Title "ledger" vs "settlement" is a weak token match on top of 0.8.
        assert!(score >= 0.8);
        assert!(score < 1.8);
    }

    #[test]
    fn status_and_priority_filters_add_fixed_bonuses() {
        let f = feature("Payment Processing", None, &[]);
        let filters = SearchFilters {
            status: Some(Status::Planned),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let score = relevance(&f, "payment", &filters);
        assert!((score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_priority_never_matches_a_priority_filter() {
        let mut f = feature("Payment Processing", None, &[]);
        f.priority = None;
        let filters = SearchFilters {
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert_eq!(relevance(&f, "payment", &filters), 1.0);
    }

    #[test]
    fn tag_bonus_is_proportional_to_overlap() {
        let f = feature("Payment Processing", None, &["payments", "wallet"]);
        let filters = SearchFilters {
            tags: ["wallet", "kyc"].iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        let score = relevance(&f, "payment", &filters);
        assert!((score - 1.15).abs() < 1e-9);
    }

    #[test]
    fn match_fields_reports_literal_substrings_only() {
        let f = feature(
            "Payment Processing",
            Some("Card and wallet payments"),
            &["payments", "fintech"],
        );
        let matches = match_fields(&f, "PAYMENT");
        assert_eq!(
            matches,
            vec![
                "Title: Payment Processing".to_string(),
                "Description: Card and wallet payments".to_string(),
                "Tags: fintech, payments".to_string(),
            ]
        );
    }

    #[test]
    fn match_fields_ignores_fuzzy_hits() {
        let f = feature("Payment Processing", None, &[]);
        assert!(match_fields(&f, "paymnt").is_empty());
        assert!(relevance(&f, "paymnt", &SearchFilters::default()) > RELEVANCE_THRESHOLD);
    }

    #[test]
    fn search_result_reads_back_by_type() {
        let module = Module {
            id: "reporting".to_string(),
            title: "Reporting".to_string(),
            description: None,
            status: Status::Planned,
            priority: None,
            tags: BTreeSet::new(),
            progress: 0,
            owner: None,
            start_date: None,
            end_date: None,
            features: Vec::new(),
        };
        let hits = vec![
            SearchResult {
                kind: RecordKind::Module,
                item: module.into(),
                score: 1.0,
                matches: vec!["Title: Reporting".to_string()],
            },
            SearchResult {
                kind: RecordKind::Feature,
                item: feature("Payment Processing", None, &[]).into(),
                score: 1.0,
                matches: Vec::new(),
            },
        ];

        let json = serde_json::to_string(&hits).unwrap();
        let back: Vec<SearchResult> = serde_json::from_str(&json).unwrap();

        assert_eq!(back, hits);
    }

    #[test]
    fn search_result_with_mismatched_item_is_rejected() {
        let json = r#"{"type":"timeline","item":{"id":"x","title":"X","status":"planned"},"score":1.0,"matches":[]}"#;
        assert!(serde_json::from_str::<SearchResult>(json).is_err());
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let early = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let late = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert!(DateRange::new(late, early).is_none());
        assert!(DateRange::new(early, early).is_some());
        assert_eq!(
            DateRange::new(early, late),
            Some(DateRange { start: early, end: late })
        );
    }
}
