//! CSV export of the record collection.

use feedback_storage::FeedbackRecord;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::ExportError;

/// Column headings, in output order.
pub const CSV_HEADERS: [&str; 16] = [
    "Name",
    "ID",
    "Program",
    "Year",
    "Course Relevance",
    "Credit Allocation",
    "Content Depth",
    "Instructor Knowledge",
    "Clarity",
    "Library",
    "Facilities",
    "Labs/Wash",
    "Overall Satisfaction",
    "Recommend",
    "Comments",
    "Submitted",
];

/// Wrap `value` in double quotes, doubling any embedded quote.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Unquoted unless the value contains a delimiter.
fn plain(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

/// `M/D/YYYY, h:mm:ss AM` in UTC.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
    );
    at.to_offset(UtcOffset::UTC)
        .format(&format)
        .unwrap_or_else(|_| at.to_string())
}

fn row(r: &FeedbackRecord) -> String {
    [
        quoted(&r.student_name),
        quoted(&r.student_id),
        quoted(&r.program),
        plain(&r.year),
        r.course_relevance.to_string(),
        quoted(&r.credit_allocation),
        r.content_depth.to_string(),
        r.instructor_knowledge.to_string(),
        r.clarity_of_instruction.to_string(),
        r.library_rating.to_string(),
        r.facilities_rating.to_string(),
        r.labs_wash_rating.to_string(),
        r.overall_satisfaction.to_string(),
        quoted(r.recommend.as_str()),
        quoted(&r.additional_comments),
        quoted(&format_timestamp(r.submitted_at)),
    ]
    .join(",")
}

/// Render `records` as CSV: a header line then one row per record, joined
/// with `\n` and no trailing newline.
pub fn to_csv(records: &[FeedbackRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }
    let lines: Vec<String> = std::iter::once(CSV_HEADERS.join(","))
        .chain(records.iter().map(row))
        .collect();
    Ok(lines.join("\n"))
}

/// `feedback_responses_<YYYY-MM-DD>.csv`
pub fn export_filename(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    let day = date
        .format(&format)
        .unwrap_or_else(|_| date.to_string());
    format!("feedback_responses_{}.csv", day)
}

#[cfg(test)]
mod tests {
    use feedback_storage::Recommend;
    use time::macros::{date, datetime};

    use super::*;

    fn record(comments: &str) -> FeedbackRecord {
        FeedbackRecord {
            id: Some("a1".into()),
            student_name: "Asha".into(),
            student_id: "S1".into(),
            program: "MCA".into(),
            year: "1".into(),
            course_relevance: 8,
            credit_allocation: "appropriate".into(),
            content_depth: 7,
            instructor_knowledge: 4,
            clarity_of_instruction: 6,
            library_rating: 9,
            facilities_rating: 3,
            labs_wash_rating: 5,
            overall_satisfaction: 8,
            recommend: Recommend::Yes,
            additional_comments: comments.into(),
            submitted_at: datetime!(2025-03-04 14:05:09 UTC),
        }
    }

    #[test]
    fn empty_collection_has_nothing_to_export() {
        let err = to_csv(&[]).unwrap_err();
        assert_eq!(err, ExportError::NoData);
        assert_eq!(err.to_string(), "No data to export");
    }

    #[test]
    fn single_record_row() {
        let csv = to_csv(&[record("fine")]).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "\"Asha\",\"S1\",\"MCA\",1,8,\"appropriate\",7,4,6,9,3,5,8,\"yes\",\"fine\",\"3/4/2025, 2:05:09 PM\""
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = to_csv(&[record("He said \"good\"")]).unwrap();
        assert!(csv.contains(",\"He said \"\"good\"\"\","));
    }

    #[test]
    fn commas_stay_inside_quoted_fields() {
        let mut r = record("a, b");
        r.student_name = "Rao, K".into();
        let csv = to_csv(&[r]).unwrap();
        assert!(csv.starts_with(&format!("{}\n\"Rao, K\"", CSV_HEADERS.join(","))));
        assert!(csv.contains("\"a, b\""));
    }

    #[test]
    fn stored_year_with_delimiters_keeps_row_shape() {
        let mut r = record("fine");
        r.year = "2,\"x".into();
        let csv = to_csv(&[r]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Asha\",\"S1\",\"MCA\",\"2,\"\"x\",8,"));
    }

    #[test]
    fn timestamp_uses_twelve_hour_clock() {
        assert_eq!(
            format_timestamp(datetime!(2025-12-25 00:00:00 UTC)),
            "12/25/2025, 12:00:00 AM"
        );
        assert_eq!(
            format_timestamp(datetime!(2025-01-09 09:30:00 +05:30)),
            "1/9/2025, 4:00:00 AM"
        );
    }

    #[test]
    fn filename_carries_iso_date() {
        assert_eq!(
            export_filename(date!(2025 - 03 - 04)),
            "feedback_responses_2025-03-04.csv"
        );
    }
}
