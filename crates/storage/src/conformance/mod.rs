//! Conformance test suite for `RecordStore` implementations.
//!
//! A backend-agnostic suite any [`RecordStore`] can run to check the
//! get-all / replace-all contract:
//!
//! - **Round trip**: empty reads, `replace_all(fetch_all())` is a no-op,
//!   replace overwrites instead of merging
//! - **Append**: submission order is kept, earlier records are untouched
//! - **Records**: every field, including awkward free text, survives storage
//! - **Concurrent**: appends racing through one store are all kept
//!
//! # Usage
//!
//! ```ignore
//! use feedback_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn file_store_conformance() {
//!     let report = run_conformance_suite(|| async { make_file_store() }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod append;
mod concurrent;
mod roundtrip;

use std::fmt;
use std::future::Future;

use time::macros::datetime;
use time::Duration;

use crate::record::{FeedbackRecord, Recommend};
use crate::RecordStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "roundtrip", "append").
    pub category: String,
    /// Test name.
    pub name: String,
    pub passed: bool,
    /// Failure message, if any.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a record store.
///
/// `factory` is called once per test and must return a fresh, empty store.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(roundtrip::run_roundtrip_tests(&factory).await);
    results.extend(append::run_append_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A complete record whose scores and timestamp vary with `n`.
fn make_record(n: u8, name: &str) -> FeedbackRecord {
    FeedbackRecord {
        id: Some(format!("rec-{}", n)),
        student_name: name.to_string(),
        student_id: format!("IIPS-{:03}", n),
        program: "M.Tech (IT)".to_string(),
        year: ((n % 5) + 1).to_string(),
        course_relevance: n % 11,
        credit_allocation: "appropriate".to_string(),
        content_depth: 5,
        instructor_knowledge: (n % 5) + 1,
        clarity_of_instruction: n % 11,
        library_rating: 6,
        facilities_rating: 3,
        labs_wash_rating: 4,
        overall_satisfaction: n % 11,
        recommend: Recommend::Maybe,
        additional_comments: format!("comment {}", n),
        submitted_at: datetime!(2025-02-01 09:00 UTC) + Duration::minutes(i64::from(n)),
    }
}

fn names(records: &[FeedbackRecord]) -> Vec<&str> {
    records.iter().map(|r| r.student_name.as_str()).collect()
}
