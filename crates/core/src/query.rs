//! Read-only views over a fetched record collection for the admin dashboard.
//!
//! Every function takes a slice and returns new data; the input collection
//! is never reordered or modified.

use std::cmp::Ordering;
use std::fmt;

use feedback_storage::FeedbackRecord;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Time since the latest submission, as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    Minutes(i64),
    Hours(i64),
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recency::Minutes(m) => write!(f, "{}m ago", m),
            Recency::Hours(h) => write!(f, "{}h ago", h),
        }
    }
}

impl Recency {
    /// Whole minutes between `then` and `now`; under an hour stays in
    /// minutes, otherwise whole hours. Future timestamps count as 0m.
    pub fn between(then: OffsetDateTime, now: OffsetDateTime) -> Self {
        let minutes = (now - then).whole_minutes().max(0);
        if minutes < 60 {
            Recency::Minutes(minutes)
        } else {
            Recency::Hours(minutes / 60)
        }
    }
}

/// Dashboard summary figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    /// Mean overall satisfaction; `None` with no records.
    pub average_satisfaction: Option<f64>,
    /// Age of the most recently appended record.
    pub latest: Option<Recency>,
    /// `min(100, count * 2)`. A display heuristic, not a measured ratio.
    pub response_rate: u8,
}

impl Stats {
    /// Average to one decimal, or `-`.
    pub fn average_label(&self) -> String {
        self.average_satisfaction
            .map(|avg| format!("{:.1}", avg))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn latest_label(&self) -> String {
        self.latest
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn response_rate_label(&self) -> String {
        format!("{}%", self.response_rate)
    }
}

pub fn stats(records: &[FeedbackRecord], now: OffsetDateTime) -> Stats {
    let count = records.len();
    let average_satisfaction = (count > 0).then(|| {
        let total: u64 = records
            .iter()
            .map(|r| u64::from(r.overall_satisfaction))
            .sum();
        total as f64 / count as f64
    });
    // Insertion order is submission order, so the last record is the newest.
    let latest = records
        .last()
        .map(|r| Recency::between(r.submitted_at, now));
    let response_rate = count.saturating_mul(2).min(100) as u8;

    Stats {
        count,
        average_satisfaction,
        latest,
        response_rate,
    }
}

/// Dashboard filter controls. Blank values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Exact year match.
    pub year: Option<String>,
    /// Case-insensitive substring of student name or student ID.
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        let year_ok = match self.year.as_deref().filter(|y| !y.is_empty()) {
            Some(year) => record.year == year,
            None => true,
        };
        let search_ok = match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                record.student_name.to_lowercase().contains(&needle)
                    || record.student_id.to_lowercase().contains(&needle)
            }
            None => true,
        };
        year_ok && search_ok
    }
}

pub fn filter(records: &[FeedbackRecord], criteria: &RecordFilter) -> Vec<FeedbackRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Table ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Student name, A to Z.
    Name,
    /// Overall satisfaction, highest first.
    Satisfaction,
    /// Submission time, newest first.
    #[default]
    Date,
}

impl SortKey {
    /// Parse a sort control value; anything unrecognised sorts by date.
    pub fn parse(value: &str) -> SortKey {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "satisfaction" => SortKey::Satisfaction,
            _ => SortKey::Date,
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A sorted copy of `records`. Ties keep their original relative order.
pub fn sort(records: &[FeedbackRecord], key: SortKey) -> Vec<FeedbackRecord> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::Name => sorted.sort_by(|a, b| compare_names(&a.student_name, &b.student_name)),
        SortKey::Satisfaction => {
            sorted.sort_by(|a, b| b.overall_satisfaction.cmp(&a.overall_satisfaction))
        }
        SortKey::Date => sorted.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at)),
    }
    sorted
}

/// The record at `index` of the currently displayed view.
///
/// Positions shift whenever the view is re-filtered or re-sorted; prefer
/// [`find_by_id`] when the record carries an identifier.
pub fn detail(records: &[FeedbackRecord], index: usize) -> Option<&FeedbackRecord> {
    records.get(index)
}

pub fn find_by_id<'a>(records: &'a [FeedbackRecord], id: &str) -> Option<&'a FeedbackRecord> {
    records.iter().find(|r| r.id.as_deref() == Some(id))
}
