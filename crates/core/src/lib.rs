//! feedback-core: the student feedback survey and its admin views.
//!
//! The survey is six fixed data pages between a start page (0) and a
//! thank-you page (7). A [`FormSession`] walks a respondent through them,
//! validating each page before it may be left forwards, and appends one
//! [`FeedbackRecord`] to a [`RecordStore`] on submit.
//!
//! # Public API
//!
//! - [`FormSession`], [`FormInputs`], [`Page`] -- the page flow
//! - [`gate::can_advance`] -- whether the current page's button is enabled
//! - [`query`] -- dashboard stats, filter, sort and lookup
//! - [`export::to_csv`] -- CSV download body
//! - [`DetailView`] -- sectioned rendering of one record
//! - [`Authenticator`] -- admin credential check

pub mod auth;
pub mod detail;
pub mod error;
pub mod export;
pub mod gate;
pub mod pages;
pub mod query;
pub mod session;

// ── Convenience re-exports: key types ────────────────────────────────

pub use auth::{Authenticator, Credentials, StaticAllowList};
pub use detail::DetailView;
pub use error::{ExportError, FlowError, ValidationError};
pub use gate::{GateAction, GateState};
pub use pages::{FormInputs, Page, PageAnswers, PAGE_COUNT};
pub use query::{RecordFilter, Recency, SortKey, Stats};
pub use session::{Draft, FormSession, PageStatus, Progress, SubmitReceipt};

pub use feedback_storage::{FeedbackRecord, RecordStore, Recommend};

// ── Convenience re-exports: operations ───────────────────────────────

pub use export::{export_filename, to_csv};
pub use query::{detail, filter, find_by_id, sort, stats};
