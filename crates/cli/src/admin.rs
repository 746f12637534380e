//! `feedback admin` -- dashboard views over the stored responses.

use std::path::{Path, PathBuf};

use feedback_core::{
    export, query, Authenticator, Credentials, DetailView, ExportError, FeedbackRecord,
    RecordFilter, SortKey, Stats,
};
use time::OffsetDateTime;

use crate::OutputFormat;

/// Failure of an admin command, reported once by the caller.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AdminError {
    #[error("Invalid username or password")]
    Unauthorized,

    #[error("no response matches '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("could not write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn login(auth: &dyn Authenticator, credentials: &Credentials) -> Result<(), AdminError> {
    if auth.authenticate(credentials) {
        tracing::info!(user = %credentials.username, "admin login");
        Ok(())
    } else {
        tracing::warn!(user = %credentials.username, "rejected admin login");
        Err(AdminError::Unauthorized)
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

pub(crate) fn render_stats(stats: &Stats) -> String {
    [
        format!("Total Responses:       {}", stats.count),
        format!("Average Satisfaction:  {}", stats.average_label()),
        format!("Latest Response:       {}", stats.latest_label()),
        format!("Response Rate:         {}", stats.response_rate_label()),
    ]
    .join("\n")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

/// One row per record, numbered from 1 in display order.
pub(crate) fn render_table(records: &[FeedbackRecord]) -> String {
    if records.is_empty() {
        return "No responses found".to_string();
    }
    let mut lines = vec![format!(
        "{:>3}  {:<20}  {:<12}  {:<10}  {:<4}  {:<12}  {:<23}  {}",
        "#", "Name", "ID", "Program", "Year", "Satisfaction", "Submitted", "Record"
    )];
    for (i, r) in records.iter().enumerate() {
        lines.push(format!(
            "{:>3}  {:<20}  {:<12}  {:<10}  {:<4}  {:<12}  {:<23}  {}",
            i + 1,
            truncate(&r.student_name, 20),
            truncate(&r.student_id, 12),
            truncate(&r.program, 10),
            r.year,
            format!("{}/10", r.overall_satisfaction),
            export::format_timestamp(r.submitted_at),
            r.id.as_deref().unwrap_or("-"),
        ));
    }
    lines.join("\n")
}

/// The displayed view: filtered, then sorted.
pub(crate) fn view(
    records: &[FeedbackRecord],
    criteria: &RecordFilter,
    key: SortKey,
) -> Vec<FeedbackRecord> {
    query::sort(&query::filter(records, criteria), key)
}

/// Resolve a record by id, or by its 1-based position in `view`.
pub(crate) fn select<'a>(
    all: &'a [FeedbackRecord],
    view: &'a [FeedbackRecord],
    selector: &str,
) -> Result<&'a FeedbackRecord, AdminError> {
    if let Some(record) = query::find_by_id(all, selector) {
        return Ok(record);
    }
    selector
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| query::detail(view, i))
        .ok_or_else(|| AdminError::NotFound(selector.to_string()))
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub(crate) fn cmd_stats(records: &[FeedbackRecord], output: OutputFormat) {
    let stats = query::stats(records, OffsetDateTime::now_utc());
    match output {
        OutputFormat::Text => println!("{}", render_stats(&stats)),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "count": stats.count,
                "averageSatisfaction": stats.average_satisfaction,
                "averageLabel": stats.average_label(),
                "latest": stats.latest_label(),
                "responseRate": stats.response_rate,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
    }
}

pub(crate) fn cmd_list(records: &[FeedbackRecord], output: OutputFormat) {
    match output {
        OutputFormat::Text => println!("{}", render_table(records)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records).unwrap_or_default());
        }
    }
}

pub(crate) fn cmd_show(record: &FeedbackRecord, output: OutputFormat) {
    match output {
        OutputFormat::Text => println!("{}", DetailView::new(record)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).unwrap_or_default());
        }
    }
}

/// Write the CSV export. `out` may be a directory (the dated filename is
/// used inside it) or a file path; `-` writes to stdout.
pub(crate) fn cmd_export(
    records: &[FeedbackRecord],
    out: &Path,
) -> Result<Option<PathBuf>, AdminError> {
    let csv = export::to_csv(records)?;
    if out == Path::new("-") {
        println!("{}", csv);
        return Ok(None);
    }
    let path = if out.is_dir() {
        out.join(export::export_filename(OffsetDateTime::now_utc().date()))
    } else {
        out.to_path_buf()
    };
    std::fs::write(&path, csv).map_err(|source| AdminError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported responses");
    Ok(Some(path))
}
