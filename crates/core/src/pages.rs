//! The six fixed survey pages, their live inputs, and their validators.
//!
//! [`FormInputs`] holds the current value of every input widget on every
//! page. Nothing selected is `None`; text boxes are plain strings and count
//! as blank after trimming; sliders always carry a value.
//!
//! [`validate`] is the authoritative per-page check: it either returns the
//! page's cleaned answers or says what is missing. The completion gate in
//! [`crate::gate`] answers the same question without producing answers.

use std::fmt;

use feedback_storage::{Recommend, NO_COMMENTS};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of data-entry pages.
pub const PAGE_COUNT: usize = 6;

/// Starting value of every slider.
pub const SLIDER_DEFAULT: u8 = 5;

/// Range of 0–10 number ratings and sliders.
pub const TEN_POINT: (u8, u8) = (0, 10);

/// Range of the 1–5 emoji ratings.
pub const FIVE_POINT: (u8, u8) = (1, 5);

/// Options of the year select.
pub const YEAR_OPTIONS: [&str; 5] = ["1", "2", "3", "4", "5"];

/// Every state of the form, in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Start,
    Identity,
    Course,
    Teaching,
    Facilities,
    Overall,
    Comments,
    ThankYou,
}

impl Page {
    /// The data-entry pages, 1 through 6.
    pub const DATA_PAGES: [Page; PAGE_COUNT] = [
        Page::Identity,
        Page::Course,
        Page::Teaching,
        Page::Facilities,
        Page::Overall,
        Page::Comments,
    ];

    pub fn number(self) -> u8 {
        match self {
            Page::Start => 0,
            Page::Identity => 1,
            Page::Course => 2,
            Page::Teaching => 3,
            Page::Facilities => 4,
            Page::Overall => 5,
            Page::Comments => 6,
            Page::ThankYou => 7,
        }
    }

    pub fn from_number(n: u8) -> Option<Page> {
        match n {
            0 => Some(Page::Start),
            1 => Some(Page::Identity),
            2 => Some(Page::Course),
            3 => Some(Page::Teaching),
            4 => Some(Page::Facilities),
            5 => Some(Page::Overall),
            6 => Some(Page::Comments),
            7 => Some(Page::ThankYou),
            _ => None,
        }
    }

    pub fn is_data_page(self) -> bool {
        !matches!(self, Page::Start | Page::ThankYou)
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Start => "Welcome",
            Page::Identity => "Student Information",
            Page::Course => "Course Content",
            Page::Teaching => "Teaching Quality",
            Page::Facilities => "Campus Facilities",
            Page::Overall => "Overall Experience",
            Page::Comments => "Additional Comments",
            Page::ThankYou => "Thank You",
        }
    }

    /// Message shown when the page's required inputs are missing.
    pub fn missing_prompt(self) -> &'static str {
        match self {
            Page::Identity => "Please fill in all required fields.",
            Page::Teaching => "Please rate your instructors' knowledge.",
            Page::Facilities => "Please rate your satisfaction with campus facilities.",
            _ => "Please answer all required questions on this page.",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

/// Current value of every input widget across the six pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInputs {
    // Page 1
    pub student_name: String,
    pub student_id: String,
    pub program: String,
    /// Year select; empty means the placeholder option.
    pub year: String,

    // Page 2
    pub course_relevance: Option<u8>,
    pub credit_allocation: Option<String>,
    pub content_depth: u8,

    // Page 3
    pub instructor_knowledge: Option<u8>,
    pub clarity_of_instruction: u8,

    // Page 4
    pub library_rating: u8,
    pub facilities_rating: Option<u8>,
    pub labs_wash_rating: u8,

    // Page 5
    pub overall_satisfaction: Option<u8>,
    pub recommend: Option<String>,

    // Page 6
    pub additional_comments: String,
}

impl Default for FormInputs {
    fn default() -> Self {
        Self {
            student_name: String::new(),
            student_id: String::new(),
            program: String::new(),
            year: String::new(),
            course_relevance: None,
            credit_allocation: None,
            content_depth: SLIDER_DEFAULT,
            instructor_knowledge: None,
            clarity_of_instruction: SLIDER_DEFAULT,
            library_rating: SLIDER_DEFAULT,
            facilities_rating: None,
            labs_wash_rating: SLIDER_DEFAULT,
            overall_satisfaction: None,
            recommend: None,
            additional_comments: String::new(),
        }
    }
}

/// Cleaned answers of one validated page, ready to merge into a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAnswers {
    Identity {
        student_name: String,
        student_id: String,
        program: String,
        year: String,
    },
    Course {
        course_relevance: u8,
        credit_allocation: String,
        content_depth: u8,
    },
    Teaching {
        instructor_knowledge: u8,
        clarity_of_instruction: u8,
    },
    Facilities {
        library_rating: u8,
        facilities_rating: u8,
        labs_wash_rating: u8,
    },
    Overall {
        overall_satisfaction: u8,
        recommend: Recommend,
    },
    Comments {
        additional_comments: String,
    },
}

/// Validate `page` against the live inputs.
///
/// Returns `None` for the start and thank-you pages, which have no inputs.
pub fn validate(page: Page, inputs: &FormInputs) -> Option<Result<PageAnswers, ValidationError>> {
    let result = match page {
        Page::Start | Page::ThankYou => return None,
        Page::Identity => validate_identity(inputs),
        Page::Course => validate_course(inputs),
        Page::Teaching => validate_teaching(inputs),
        Page::Facilities => validate_facilities(inputs),
        Page::Overall => validate_overall(inputs),
        Page::Comments => Ok(validate_comments(inputs)),
    };
    Some(result)
}

/// Collects missing field names while reading a page.
struct Reader {
    page: Page,
    missing: Vec<&'static str>,
}

impl Reader {
    fn new(page: Page) -> Self {
        Self {
            page,
            missing: Vec::new(),
        }
    }

    fn text(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.missing.push(field);
        }
        trimmed.to_string()
    }

    fn choice(&mut self, field: &'static str, value: Option<&str>) -> String {
        self.text(field, value.unwrap_or(""))
    }

    fn selected(&mut self, field: &'static str, value: Option<u8>) -> u8 {
        value.unwrap_or_else(|| {
            self.missing.push(field);
            0
        })
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequired {
                page: self.page,
                fields: self.missing,
            })
        }
    }
}

fn in_range(field: &'static str, value: u8, (min, max): (u8, u8)) -> Result<u8, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn validate_identity(inputs: &FormInputs) -> Result<PageAnswers, ValidationError> {
    let mut r = Reader::new(Page::Identity);
    let student_name = r.text("studentName", &inputs.student_name);
    let student_id = r.text("studentId", &inputs.student_id);
    let program = r.text("program", &inputs.program);
    let year = r.text("year", &inputs.year);
    r.finish()?;
    if !YEAR_OPTIONS.contains(&year.as_str()) {
        return Err(ValidationError::InvalidChoice {
            field: "year",
            value: year,
        });
    }
    Ok(PageAnswers::Identity {
        student_name,
        student_id,
        program,
        year,
    })
}

fn validate_course(inputs: &FormInputs) -> Result<PageAnswers, ValidationError> {
    let mut r = Reader::new(Page::Course);
    let course_relevance = r.selected("courseRelevance", inputs.course_relevance);
    let credit_allocation = r.choice("creditAllocation", inputs.credit_allocation.as_deref());
    r.finish()?;
    Ok(PageAnswers::Course {
        course_relevance: in_range("courseRelevance", course_relevance, TEN_POINT)?,
        credit_allocation,
        content_depth: in_range("contentDepth", inputs.content_depth, TEN_POINT)?,
    })
}

fn validate_teaching(inputs: &FormInputs) -> Result<PageAnswers, ValidationError> {
    let mut r = Reader::new(Page::Teaching);
    let instructor_knowledge = r.selected("instructorKnowledge", inputs.instructor_knowledge);
    r.finish()?;
    Ok(PageAnswers::Teaching {
        instructor_knowledge: in_range("instructorKnowledge", instructor_knowledge, FIVE_POINT)?,
        clarity_of_instruction: in_range(
            "clarityOfInstruction",
            inputs.clarity_of_instruction,
            TEN_POINT,
        )?,
    })
}

fn validate_facilities(inputs: &FormInputs) -> Result<PageAnswers, ValidationError> {
    let mut r = Reader::new(Page::Facilities);
    let facilities_rating = r.selected("facilitiesRating", inputs.facilities_rating);
    r.finish()?;
    Ok(PageAnswers::Facilities {
        library_rating: in_range("libraryRating", inputs.library_rating, TEN_POINT)?,
        facilities_rating: in_range("facilitiesRating", facilities_rating, FIVE_POINT)?,
        labs_wash_rating: in_range("labsWashRating", inputs.labs_wash_rating, TEN_POINT)?,
    })
}

fn validate_overall(inputs: &FormInputs) -> Result<PageAnswers, ValidationError> {
    let mut r = Reader::new(Page::Overall);
    let overall_satisfaction = r.selected("overallSatisfaction", inputs.overall_satisfaction);
    let recommend = r.choice("recommend", inputs.recommend.as_deref());
    r.finish()?;
    let recommend = Recommend::parse(&recommend).ok_or(ValidationError::InvalidChoice {
        field: "recommend",
        value: recommend,
    })?;
    Ok(PageAnswers::Overall {
        overall_satisfaction: in_range("overallSatisfaction", overall_satisfaction, TEN_POINT)?,
        recommend,
    })
}

fn validate_comments(inputs: &FormInputs) -> PageAnswers {
    let comments = inputs.additional_comments.trim();
    let additional_comments = if comments.is_empty() {
        NO_COMMENTS.to_string()
    } else {
        comments.to_string()
    };
    PageAnswers::Comments {
        additional_comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_missing(page: Page, inputs: &FormInputs) -> Vec<&'static str> {
        match validate(page, inputs) {
            Some(Err(ValidationError::MissingRequired { fields, .. })) => fields,
            other => panic!("expected missing fields on {page}, got {other:?}"),
        }
    }

    #[test]
    fn page_numbers_round_trip() {
        for n in 0..=7 {
            assert_eq!(Page::from_number(n).map(Page::number), Some(n));
        }
        assert_eq!(Page::from_number(8), None);
    }

    #[test]
    fn identity_reports_every_blank_field() {
        let mut inputs = FormInputs::default();
        inputs.student_name = "   ".into();
        inputs.program = "MCA".into();
        assert_eq!(
            expect_missing(Page::Identity, &inputs),
            vec!["studentName", "studentId", "year"]
        );
    }

    #[test]
    fn identity_trims_values() {
        let inputs = FormInputs {
            student_name: "  Asha Rao ".into(),
            student_id: "IIPS-1".into(),
            program: "MCA".into(),
            year: "2".into(),
            ..FormInputs::default()
        };
        assert_eq!(
            validate(Page::Identity, &inputs),
            Some(Ok(PageAnswers::Identity {
                student_name: "Asha Rao".into(),
                student_id: "IIPS-1".into(),
                program: "MCA".into(),
                year: "2".into(),
            }))
        );
    }

    #[test]
    fn year_outside_options_is_invalid_choice() {
        let inputs = FormInputs {
            student_name: "A".into(),
            student_id: "S".into(),
            program: "P".into(),
            year: "2,\"x".into(),
            ..FormInputs::default()
        };
        assert_eq!(
            validate(Page::Identity, &inputs),
            Some(Err(ValidationError::InvalidChoice {
                field: "year",
                value: "2,\"x".into(),
            }))
        );
    }

    #[test]
    fn course_needs_rating_and_credit_choice() {
        let mut inputs = FormInputs::default();
        assert_eq!(
            expect_missing(Page::Course, &inputs),
            vec!["courseRelevance", "creditAllocation"]
        );
        inputs.course_relevance = Some(0);
        inputs.credit_allocation = Some("appropriate".into());
        assert_eq!(
            validate(Page::Course, &inputs),
            Some(Ok(PageAnswers::Course {
                course_relevance: 0,
                credit_allocation: "appropriate".into(),
                content_depth: SLIDER_DEFAULT,
            }))
        );
    }

    #[test]
    fn five_point_rating_rejects_zero() {
        let inputs = FormInputs {
            instructor_knowledge: Some(0),
            ..FormInputs::default()
        };
        assert_eq!(
            validate(Page::Teaching, &inputs),
            Some(Err(ValidationError::OutOfRange {
                field: "instructorKnowledge",
                value: 0,
                min: 1,
                max: 5,
            }))
        );
    }

    #[test]
    fn slider_out_of_range_is_rejected() {
        let inputs = FormInputs {
            facilities_rating: Some(3),
            labs_wash_rating: 11,
            ..FormInputs::default()
        };
        assert!(matches!(
            validate(Page::Facilities, &inputs),
            Some(Err(ValidationError::OutOfRange {
                field: "labsWashRating",
                ..
            }))
        ));
    }

    #[test]
    fn unknown_recommend_value_is_invalid_choice() {
        let inputs = FormInputs {
            overall_satisfaction: Some(8),
            recommend: Some("perhaps".into()),
            ..FormInputs::default()
        };
        assert_eq!(
            validate(Page::Overall, &inputs),
            Some(Err(ValidationError::InvalidChoice {
                field: "recommend",
                value: "perhaps".into(),
            }))
        );
    }

    #[test]
    fn comments_are_optional_with_placeholder() {
        let mut inputs = FormInputs::default();
        inputs.additional_comments = " \n ".into();
        assert_eq!(
            validate(Page::Comments, &inputs),
            Some(Ok(PageAnswers::Comments {
                additional_comments: NO_COMMENTS.into()
            }))
        );
    }

    #[test]
    fn missing_prompts_match_pages() {
        let err = ValidationError::MissingRequired {
            page: Page::Teaching,
            fields: vec!["instructorKnowledge"],
        };
        assert_eq!(err.to_string(), "Please rate your instructors' knowledge.");
    }

    #[test]
    fn start_and_thank_you_have_no_validator() {
        let inputs = FormInputs::default();
        assert!(validate(Page::Start, &inputs).is_none());
        assert!(validate(Page::ThankYou, &inputs).is_none());
    }

    #[test]
    fn inputs_deserialize_with_slider_defaults() {
        let inputs: FormInputs =
            serde_json::from_value(serde_json::json!({ "studentName": "Asha" })).unwrap();
        assert_eq!(inputs.student_name, "Asha");
        assert_eq!(inputs.content_depth, SLIDER_DEFAULT);
        assert_eq!(inputs.course_relevance, None);
    }
}
