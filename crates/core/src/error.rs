use crate::pages::Page;

/// Why a page's answers were rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more required inputs are blank or unselected. `fields` uses the
    /// stored (camelCase) field names.
    #[error("{}", .page.missing_prompt())]
    MissingRequired {
        page: Page,
        fields: Vec<&'static str>,
    },

    /// A score outside the range its widget allows.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    /// A choice input holding a value that is not one of its options.
    #[error("'{value}' is not a valid choice for {field}")]
    InvalidChoice { field: &'static str, value: String },
}

impl ValidationError {
    /// Structured form for JSON surfaces.
    pub fn to_json_value(&self) -> serde_json::Value {
        let fields: Vec<&str> = match self {
            ValidationError::MissingRequired { fields, .. } => fields.clone(),
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidChoice { field, .. } => vec![*field],
        };
        serde_json::json!({
            "error": "validation",
            "message": self.to_string(),
            "fields": fields,
        })
    }
}

/// Errors from driving a [`FormSession`](crate::FormSession).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Page number outside 0..=7.
    #[error("there is no page {0}")]
    NoSuchPage(u8),

    /// Validation was requested for the start or thank-you page.
    #[error("page {0} has no answers to validate")]
    NotADataPage(u8),

    /// The thank-you page is only reachable by submitting.
    #[error("the thank-you page is reached by submitting the form")]
    TerminalRequiresSubmit,

    /// Submission attempted away from the comments page.
    #[error("the form can only be submitted from page 6 (currently on page {current})")]
    NotOnFinalPage { current: u8 },

    /// Submission attempted before every data page was validated.
    #[error("pages {missing:?} must be completed before submitting")]
    IncompletePages { missing: Vec<u8> },

    #[error("this form has already been submitted")]
    AlreadySubmitted,
}

impl FlowError {
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FlowError::Validation(v) => v.to_json_value(),
            other => serde_json::json!({
                "error": "flow",
                "message": other.to_string(),
            }),
        }
    }
}

/// Errors from exporting records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// Nothing to export; no file should be produced.
    #[error("No data to export")]
    NoData,
}
