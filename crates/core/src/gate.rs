//! Completion gate: whether the current page's advance button is enabled.
//!
//! Re-run on every input change. It never touches a session and never builds
//! answers; it must agree with [`pages::validate`](crate::pages::validate)
//! on every input, which the property tests below check.

use feedback_storage::Recommend;
use serde::Serialize;

use crate::pages::{FormInputs, Page, FIVE_POINT, TEN_POINT, YEAR_OPTIONS};

/// The action the gated button performs on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    Next,
    Submit,
    /// The start and thank-you pages have no gated button.
    None,
}

/// Snapshot of the gate for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateState {
    pub page: Page,
    pub action: GateAction,
    pub enabled: bool,
}

pub fn action(page: Page) -> GateAction {
    match page {
        Page::Start | Page::ThankYou => GateAction::None,
        Page::Comments => GateAction::Submit,
        _ => GateAction::Next,
    }
}

/// True when `page` meets its minimum requirements for advancing.
pub fn can_advance(page: Page, inputs: &FormInputs) -> bool {
    let filled = |s: &str| !s.trim().is_empty();
    let within = |v: u8, (min, max): (u8, u8)| min <= v && v <= max;
    let picked = |v: Option<u8>, range: (u8, u8)| v.is_some_and(|v| within(v, range));

    match page {
        Page::Start | Page::ThankYou => false,
        Page::Identity => {
            filled(&inputs.student_name)
                && filled(&inputs.student_id)
                && filled(&inputs.program)
                && YEAR_OPTIONS.contains(&inputs.year.trim())
        }
        Page::Course => {
            picked(inputs.course_relevance, TEN_POINT)
                && inputs.credit_allocation.as_deref().is_some_and(filled)
                && within(inputs.content_depth, TEN_POINT)
        }
        Page::Teaching => {
            picked(inputs.instructor_knowledge, FIVE_POINT)
                && within(inputs.clarity_of_instruction, TEN_POINT)
        }
        Page::Facilities => {
            picked(inputs.facilities_rating, FIVE_POINT)
                && within(inputs.library_rating, TEN_POINT)
                && within(inputs.labs_wash_rating, TEN_POINT)
        }
        Page::Overall => {
            picked(inputs.overall_satisfaction, TEN_POINT)
                && inputs
                    .recommend
                    .as_deref()
                    .and_then(Recommend::parse)
                    .is_some()
        }
        // Comments are optional.
        Page::Comments => true,
    }
}

pub fn evaluate(page: Page, inputs: &FormInputs) -> GateState {
    GateState {
        page,
        action: action(page),
        enabled: can_advance(page, inputs),
    }
}
