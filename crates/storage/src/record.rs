use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Placeholder stored when a respondent leaves the comment box blank.
pub const NO_COMMENTS: &str = "No additional comments";

/// Whether the respondent would recommend the institute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommend {
    Yes,
    No,
    Maybe,
}

impl Recommend {
    pub fn as_str(self) -> &'static str {
        match self {
            Recommend::Yes => "yes",
            Recommend::No => "no",
            Recommend::Maybe => "maybe",
        }
    }

    /// Parse a radio-button value. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Recommend::Yes),
            "no" => Some(Recommend::No),
            "maybe" => Some(Recommend::Maybe),
            _ => None,
        }
    }
}

impl fmt::Display for Recommend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed feedback submission.
///
/// Serialized with camelCase keys; the whole collection is stored as a single
/// JSON array under one key. Records are never edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Stable identifier assigned at submission. Absent on records written
    /// before identifiers existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub student_name: String,
    pub student_id: String,
    pub program: String,
    pub year: String,

    #[serde(deserialize_with = "lenient_score")]
    pub course_relevance: u8,
    pub credit_allocation: String,
    #[serde(deserialize_with = "lenient_score")]
    pub content_depth: u8,

    #[serde(deserialize_with = "lenient_score")]
    pub instructor_knowledge: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub clarity_of_instruction: u8,

    #[serde(deserialize_with = "lenient_score")]
    pub library_rating: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub facilities_rating: u8,
    #[serde(deserialize_with = "lenient_score")]
    pub labs_wash_rating: u8,

    #[serde(deserialize_with = "lenient_score")]
    pub overall_satisfaction: u8,
    pub recommend: Recommend,

    #[serde(default = "no_comments")]
    pub additional_comments: String,

    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

fn no_comments() -> String {
    NO_COMMENTS.to_string()
}

/// Widget values used to be stored as strings (`"8"`), so scores are read
/// from either a JSON number or a numeric string.
fn lenient_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(u64),
        Text(String),
    }

    let raw = match Score::deserialize(deserializer)? {
        Score::Number(n) => n,
        Score::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid score '{}'", s)))?,
    };
    u8::try_from(raw).map_err(|_| serde::de::Error::custom(format!("score {} out of range", raw)))
}
