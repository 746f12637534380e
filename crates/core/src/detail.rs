//! Sectioned view of a single record, as shown in the dashboard's detail pane.

use std::fmt;

use feedback_storage::FeedbackRecord;
use serde::Serialize;

use crate::export::format_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: &'static str,
    /// Label and rendered value pairs. An empty label prints the value alone.
    pub lines: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub sections: Vec<Section>,
    pub submitted: String,
}

fn out_of(value: u8, max: u8) -> String {
    format!("{}/{}", value, max)
}

impl DetailView {
    pub fn new(r: &FeedbackRecord) -> Self {
        let sections = vec![
            Section {
                title: "Student Information",
                lines: vec![
                    ("Name", r.student_name.clone()),
                    ("ID", r.student_id.clone()),
                    ("Program", r.program.clone()),
                    ("Year", r.year.clone()),
                ],
            },
            Section {
                title: "Course Content",
                lines: vec![
                    ("Course Relevance", out_of(r.course_relevance, 10)),
                    ("Credit Allocation", r.credit_allocation.clone()),
                    ("Content Depth", out_of(r.content_depth, 10)),
                ],
            },
            Section {
                title: "Teaching Quality",
                lines: vec![
                    ("Instructor Knowledge", out_of(r.instructor_knowledge, 5)),
                    ("Clarity of Instruction", out_of(r.clarity_of_instruction, 10)),
                ],
            },
            Section {
                title: "Campus Facilities",
                lines: vec![
                    ("Library Rating", out_of(r.library_rating, 10)),
                    ("Facilities Rating", out_of(r.facilities_rating, 5)),
                    ("Labs & Washrooms", out_of(r.labs_wash_rating, 10)),
                ],
            },
            Section {
                title: "Overall Experience",
                lines: vec![
                    ("Overall Satisfaction", out_of(r.overall_satisfaction, 10)),
                    ("Would Recommend", r.recommend.to_string()),
                ],
            },
            Section {
                title: "Additional Comments",
                lines: vec![("", r.additional_comments.clone())],
            },
        ];
        DetailView {
            sections,
            submitted: format_timestamp(r.submitted_at),
        }
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section.title)?;
            for (label, value) in &section.lines {
                if label.is_empty() {
                    writeln!(f, "  {}", value)?;
                } else {
                    writeln!(f, "  {}: {}", label, value)?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "Submitted: {}", self.submitted)
    }
}

#[cfg(test)]
mod tests {
    use feedback_storage::Recommend;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn renders_every_section_in_order() {
        let record = FeedbackRecord {
            id: None,
            student_name: "Asha".into(),
            student_id: "S1".into(),
            program: "MBA".into(),
            year: "2".into(),
            course_relevance: 8,
            credit_allocation: "too-high".into(),
            content_depth: 5,
            instructor_knowledge: 4,
            clarity_of_instruction: 6,
            library_rating: 9,
            facilities_rating: 2,
            labs_wash_rating: 5,
            overall_satisfaction: 7,
            recommend: Recommend::Maybe,
            additional_comments: "More labs".into(),
            submitted_at: datetime!(2025-06-01 18:00 UTC),
        };
        let text = DetailView::new(&record).to_string();

        let titles = [
            "Student Information",
            "Course Content",
            "Teaching Quality",
            "Campus Facilities",
            "Overall Experience",
            "Additional Comments",
        ];
        let mut cursor = 0;
        for title in titles {
            let at = text[cursor..].find(title).expect(title);
            cursor += at + title.len();
        }
        assert!(text.contains("  Instructor Knowledge: 4/5\n"));
        assert!(text.contains("  Facilities Rating: 2/5\n"));
        assert!(text.contains("  Would Recommend: maybe\n"));
        assert!(text.contains("  More labs\n"));
        assert!(text.ends_with("Submitted: 6/1/2025, 6:00:00 PM"));
    }
}
