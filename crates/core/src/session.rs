//! One respondent's in-progress form.
//!
//! A [`FormSession`] is created once per respondent and owned by whatever
//! drives the pages (the terminal survey, an HTTP session slot). It tracks
//! the current page, the set of pages that passed validation, and the draft
//! answers merged from those pages. Nothing here is persisted until
//! [`FormSession::submit`] appends the finished record to a store.

use std::collections::BTreeSet;
use std::fmt;

use feedback_storage::{FeedbackRecord, RecordStore, Recommend};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::FlowError;
use crate::pages::{self, FormInputs, Page, PageAnswers, PAGE_COUNT};

/// Answers merged so far. A field is `None` until its page validates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub student_name: Option<String>,
    pub student_id: Option<String>,
    pub program: Option<String>,
    pub year: Option<String>,
    pub course_relevance: Option<u8>,
    pub credit_allocation: Option<String>,
    pub content_depth: Option<u8>,
    pub instructor_knowledge: Option<u8>,
    pub clarity_of_instruction: Option<u8>,
    pub library_rating: Option<u8>,
    pub facilities_rating: Option<u8>,
    pub labs_wash_rating: Option<u8>,
    pub overall_satisfaction: Option<u8>,
    pub recommend: Option<Recommend>,
    pub additional_comments: Option<String>,
}

impl Draft {
    /// Overwrite the fields belonging to one page. Later answers win.
    pub fn merge(&mut self, answers: PageAnswers) {
        match answers {
            PageAnswers::Identity {
                student_name,
                student_id,
                program,
                year,
            } => {
                self.student_name = Some(student_name);
                self.student_id = Some(student_id);
                self.program = Some(program);
                self.year = Some(year);
            }
            PageAnswers::Course {
                course_relevance,
                credit_allocation,
                content_depth,
            } => {
                self.course_relevance = Some(course_relevance);
                self.credit_allocation = Some(credit_allocation);
                self.content_depth = Some(content_depth);
            }
            PageAnswers::Teaching {
                instructor_knowledge,
                clarity_of_instruction,
            } => {
                self.instructor_knowledge = Some(instructor_knowledge);
                self.clarity_of_instruction = Some(clarity_of_instruction);
            }
            PageAnswers::Facilities {
                library_rating,
                facilities_rating,
                labs_wash_rating,
            } => {
                self.library_rating = Some(library_rating);
                self.facilities_rating = Some(facilities_rating);
                self.labs_wash_rating = Some(labs_wash_rating);
            }
            PageAnswers::Overall {
                overall_satisfaction,
                recommend,
            } => {
                self.overall_satisfaction = Some(overall_satisfaction);
                self.recommend = Some(recommend);
            }
            PageAnswers::Comments {
                additional_comments,
            } => {
                self.additional_comments = Some(additional_comments);
            }
        }
    }

    /// Build the final record, or list the page numbers still missing.
    fn into_record(
        self,
        id: String,
        submitted_at: OffsetDateTime,
    ) -> Result<FeedbackRecord, Vec<u8>> {
        let complete = [
            (
                Page::Identity,
                self.student_name.is_some()
                    && self.student_id.is_some()
                    && self.program.is_some()
                    && self.year.is_some(),
            ),
            (
                Page::Course,
                self.course_relevance.is_some()
                    && self.credit_allocation.is_some()
                    && self.content_depth.is_some(),
            ),
            (
                Page::Teaching,
                self.instructor_knowledge.is_some() && self.clarity_of_instruction.is_some(),
            ),
            (
                Page::Facilities,
                self.library_rating.is_some()
                    && self.facilities_rating.is_some()
                    && self.labs_wash_rating.is_some(),
            ),
            (
                Page::Overall,
                self.overall_satisfaction.is_some() && self.recommend.is_some(),
            ),
            (Page::Comments, self.additional_comments.is_some()),
        ];
        let missing: Vec<u8> = complete
            .iter()
            .filter(|(_, done)| !done)
            .map(|(page, _)| page.number())
            .collect();

        match (
            self.student_name,
            self.student_id,
            self.program,
            self.year,
            self.course_relevance,
            self.credit_allocation,
            self.content_depth,
            self.instructor_knowledge,
            self.clarity_of_instruction,
            self.library_rating,
            self.facilities_rating,
            self.labs_wash_rating,
            self.overall_satisfaction,
            self.recommend,
            self.additional_comments,
        ) {
            (
                Some(student_name),
                Some(student_id),
                Some(program),
                Some(year),
                Some(course_relevance),
                Some(credit_allocation),
                Some(content_depth),
                Some(instructor_knowledge),
                Some(clarity_of_instruction),
                Some(library_rating),
                Some(facilities_rating),
                Some(labs_wash_rating),
                Some(overall_satisfaction),
                Some(recommend),
                Some(additional_comments),
            ) => Ok(FeedbackRecord {
                id: Some(id),
                student_name,
                student_id,
                program,
                year,
                course_relevance,
                credit_allocation,
                content_depth,
                instructor_knowledge,
                clarity_of_instruction,
                library_rating,
                facilities_rating,
                labs_wash_rating,
                overall_satisfaction,
                recommend,
                additional_comments,
                submitted_at,
            }),
            _ => Err(missing),
        }
    }
}

/// Sidebar status of one data page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageStatus {
    pub page: Page,
    pub completed: bool,
    pub active: bool,
    /// Completed pages and the current page can be jumped to.
    pub clickable: bool,
}

/// Progress through the six data pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub pages: Vec<PageStatus>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

/// Outcome of a submission that reached the thank-you page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub record: FeedbackRecord,
    /// False when the store could not persist the record; it then lives only
    /// in the store's volatile buffer.
    pub durable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSession {
    current: Page,
    completed: BTreeSet<Page>,
    draft: Draft,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> Page {
        self.current
    }

    pub fn completed_pages(&self) -> &BTreeSet<Page> {
        &self.completed
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.current == Page::ThankYou
    }

    /// Validate one data page and merge its answers into the draft.
    ///
    /// On failure the session is left exactly as it was.
    pub fn validate_page(&mut self, page: Page, inputs: &FormInputs) -> Result<(), FlowError> {
        let answers = pages::validate(page, inputs)
            .ok_or(FlowError::NotADataPage(page.number()))??;
        self.draft.merge(answers);
        self.completed.insert(page);
        tracing::debug!(page = page.number(), "page validated");
        Ok(())
    }

    /// Move to page `target` (0..=6).
    ///
    /// Moving backward or staying put is always allowed, as is leaving the
    /// start page. Any other forward move first validates the current page.
    pub fn go_to(&mut self, target: u8, inputs: &FormInputs) -> Result<Page, FlowError> {
        if self.is_submitted() {
            return Err(FlowError::AlreadySubmitted);
        }
        let target = Page::from_number(target).ok_or(FlowError::NoSuchPage(target))?;
        if target == Page::ThankYou {
            return Err(FlowError::TerminalRequiresSubmit);
        }

        if target > self.current && self.current != Page::Start {
            if let Err(e) = self.validate_page(self.current, inputs) {
                tracing::debug!(
                    from = self.current.number(),
                    to = target.number(),
                    error = %e,
                    "navigation rejected"
                );
                return Err(e);
            }
        }

        self.current = target;
        Ok(target)
    }

    /// Submit the form from the comments page.
    pub async fn submit<S>(
        &mut self,
        inputs: &FormInputs,
        store: &S,
    ) -> Result<SubmitReceipt, FlowError>
    where
        S: RecordStore + ?Sized,
    {
        self.submit_at(inputs, store, OffsetDateTime::now_utc()).await
    }

    /// [`submit`](Self::submit) with an explicit submission time.
    ///
    /// A store that fails to persist does not block the respondent: the
    /// session still moves to the thank-you page and the receipt reports
    /// `durable: false`.
    pub async fn submit_at<S>(
        &mut self,
        inputs: &FormInputs,
        store: &S,
        submitted_at: OffsetDateTime,
    ) -> Result<SubmitReceipt, FlowError>
    where
        S: RecordStore + ?Sized,
    {
        if self.is_submitted() {
            return Err(FlowError::AlreadySubmitted);
        }
        if self.current != Page::Comments {
            return Err(FlowError::NotOnFinalPage {
                current: self.current.number(),
            });
        }
        let missing: Vec<u8> = Page::DATA_PAGES
            .iter()
            .filter(|p| **p != Page::Comments && !self.completed.contains(*p))
            .map(|p| p.number())
            .collect();
        if !missing.is_empty() {
            return Err(FlowError::IncompletePages { missing });
        }
        self.validate_page(Page::Comments, inputs)?;

        let id = Uuid::new_v4().to_string();
        let record = self
            .draft
            .clone()
            .into_record(id, submitted_at)
            .map_err(|missing| FlowError::IncompletePages { missing })?;

        let durable = store.append(record.clone()).await;
        if durable {
            tracing::info!(record_id = ?record.id, "feedback submitted");
        } else {
            tracing::warn!(
                record_id = ?record.id,
                "feedback accepted but NOT durably saved; kept in volatile fallback"
            );
        }

        self.current = Page::ThankYou;
        Ok(SubmitReceipt { record, durable })
    }

    pub fn progress(&self) -> Progress {
        let pages = Page::DATA_PAGES
            .iter()
            .map(|&page| {
                let completed = self.completed.contains(&page);
                let active = self.current == page;
                PageStatus {
                    page,
                    completed,
                    active,
                    clickable: completed || active,
                }
            })
            .collect();
        Progress {
            completed: self.completed.len(),
            total: PAGE_COUNT,
            pages,
        }
    }

    /// Exit and start over, discarding every unsubmitted answer.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use feedback_storage::{KvRecordStore, MemoryKv, NO_COMMENTS};
    use time::macros::datetime;

    use super::*;
    use crate::error::ValidationError;

    fn complete_inputs() -> FormInputs {
        FormInputs {
            student_name: "Asha Rao".into(),
            student_id: "IIPS-042".into(),
            program: "MCA".into(),
            year: "2".into(),
            course_relevance: Some(9),
            credit_allocation: Some("appropriate".into()),
            content_depth: 6,
            instructor_knowledge: Some(4),
            clarity_of_instruction: 7,
            library_rating: 8,
            facilities_rating: Some(3),
            labs_wash_rating: 4,
            overall_satisfaction: Some(8),
            recommend: Some("yes".into()),
            additional_comments: String::new(),
        }
    }

    /// Walk pages 1..=6 with the given inputs.
    fn walk_to_comments(session: &mut FormSession, inputs: &FormInputs) {
        for n in 1..=6 {
            session.go_to(n, inputs).unwrap();
        }
        assert_eq!(session.current_page(), Page::Comments);
    }

    #[test]
    fn leaving_start_needs_no_validation() {
        let mut session = FormSession::new();
        assert_eq!(session.go_to(1, &FormInputs::default()), Ok(Page::Identity));
        assert!(session.completed_pages().is_empty());
    }

    #[test]
    fn blocked_advance_leaves_state_unchanged_on_every_page() {
        let full = complete_inputs();
        let blank = FormInputs::default();
        for n in 1..=5u8 {
            let mut session = FormSession::new();
            for step in 1..=n {
                session.go_to(step, &full).unwrap();
            }
            let before = session.clone();
            let result = session.go_to(n + 1, &blank);
            assert!(
                matches!(
                    result,
                    Err(FlowError::Validation(ValidationError::MissingRequired { .. }))
                ),
                "page {n}: {result:?}"
            );
            assert_eq!(session, before, "page {n} changed on rejected advance");
        }
    }

    #[test]
    fn backward_moves_skip_validation() {
        let full = complete_inputs();
        let mut session = FormSession::new();
        session.go_to(1, &full).unwrap();
        session.go_to(2, &full).unwrap();
        session.go_to(3, &full).unwrap();
        assert_eq!(session.go_to(1, &FormInputs::default()), Ok(Page::Identity));
        assert_eq!(session.go_to(1, &FormInputs::default()), Ok(Page::Identity));
    }

    #[test]
    fn completed_pages_only_grow() {
        let mut inputs = complete_inputs();
        let mut session = FormSession::new();
        session.go_to(1, &inputs).unwrap();
        session.go_to(2, &inputs).unwrap();
        session.go_to(3, &inputs).unwrap();
        let snapshot = session.completed_pages().clone();
        assert_eq!(
            snapshot.iter().map(|p| p.number()).collect::<Vec<_>>(),
            vec![1, 2]
        );

        // Going back and failing validation must not remove anything.
        session.go_to(1, &inputs).unwrap();
        inputs.student_name.clear();
        assert!(session.go_to(2, &inputs).is_err());
        assert!(snapshot.is_subset(session.completed_pages()));
    }

    #[test]
    fn revalidation_overwrites_draft() {
        let mut inputs = complete_inputs();
        let mut session = FormSession::new();
        session.go_to(1, &inputs).unwrap();
        session.go_to(2, &inputs).unwrap();
        assert_eq!(session.draft().student_name.as_deref(), Some("Asha Rao"));

        session.go_to(1, &inputs).unwrap();
        inputs.student_name = "Asha R.".into();
        session.go_to(2, &inputs).unwrap();
        assert_eq!(session.draft().student_name.as_deref(), Some("Asha R."));
    }

    #[test]
    fn thank_you_and_unknown_pages_are_not_navigable() {
        let mut session = FormSession::new();
        let inputs = complete_inputs();
        assert_eq!(
            session.go_to(7, &inputs),
            Err(FlowError::TerminalRequiresSubmit)
        );
        assert_eq!(session.go_to(9, &inputs), Err(FlowError::NoSuchPage(9)));
        assert_eq!(session.current_page(), Page::Start);
    }

    #[test]
    fn validating_start_page_is_an_error() {
        let mut session = FormSession::new();
        assert_eq!(
            session.validate_page(Page::Start, &complete_inputs()),
            Err(FlowError::NotADataPage(0))
        );
    }

    #[test]
    fn progress_tracks_sidebar() {
        let inputs = complete_inputs();
        let mut session = FormSession::new();
        session.go_to(1, &inputs).unwrap();
        session.go_to(2, &inputs).unwrap();
        let progress = session.progress();
        assert_eq!(progress.to_string(), "1/6");
        assert!(progress.pages[0].completed && progress.pages[0].clickable);
        assert!(progress.pages[1].active && progress.pages[1].clickable);
        assert!(!progress.pages[2].clickable);
    }

    #[test]
    fn reset_discards_everything() {
        let inputs = complete_inputs();
        let mut session = FormSession::new();
        session.go_to(1, &inputs).unwrap();
        session.go_to(2, &inputs).unwrap();
        session.reset();
        assert_eq!(session, FormSession::new());
    }

    #[tokio::test]
    async fn submit_appends_record_and_finishes() {
        let store = KvRecordStore::new(Arc::new(MemoryKv::new()));
        let inputs = complete_inputs();
        let mut session = FormSession::new();
        walk_to_comments(&mut session, &inputs);

        let at = datetime!(2025-03-01 10:00 UTC);
        let receipt = session.submit_at(&inputs, &store, at).await.unwrap();
        assert!(receipt.durable);
        assert_eq!(session.current_page(), Page::ThankYou);
        assert_eq!(receipt.record.submitted_at, at);
        assert_eq!(receipt.record.additional_comments, NO_COMMENTS);
        assert!(receipt.record.id.is_some());
        assert_eq!(store.fetch_all().await, vec![receipt.record]);
        assert_eq!(session.completed_pages().len(), 6);
    }

    #[tokio::test]
    async fn submit_fails_open_when_store_is_down() {
        let kv = Arc::new(MemoryKv::new());
        kv.set_unavailable(true);
        let store = KvRecordStore::new(kv);
        let inputs = complete_inputs();
        let mut session = FormSession::new();
        walk_to_comments(&mut session, &inputs);

        let receipt = session.submit(&inputs, &store).await.unwrap();
        assert!(!receipt.durable);
        assert_eq!(session.current_page(), Page::ThankYou);
        // The volatile buffer still holds it for this process.
        assert_eq!(store.fetch_all().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_requires_final_page_and_all_pages() {
        let store = KvRecordStore::volatile();
        let inputs = complete_inputs();

        let mut session = FormSession::new();
        session.go_to(1, &inputs).unwrap();
        assert_eq!(
            session.submit(&inputs, &store).await,
            Err(FlowError::NotOnFinalPage { current: 1 })
        );

        // Jumping straight from the start page skips pages 1-5.
        let mut session = FormSession::new();
        session.go_to(6, &inputs).unwrap();
        assert_eq!(
            session.submit(&inputs, &store).await,
            Err(FlowError::IncompletePages {
                missing: vec![1, 2, 3, 4, 5]
            })
        );
        assert_eq!(session.current_page(), Page::Comments);
        assert!(session.completed_pages().is_empty());
        assert!(store.fetch_all().await.is_empty());
    }

    #[tokio::test]
    async fn submitted_session_is_closed() {
        let store = KvRecordStore::volatile();
        let inputs = complete_inputs();
        let mut session = FormSession::new();
        walk_to_comments(&mut session, &inputs);
        session.submit(&inputs, &store).await.unwrap();

        assert_eq!(
            session.submit(&inputs, &store).await,
            Err(FlowError::AlreadySubmitted)
        );
        assert_eq!(session.go_to(1, &inputs), Err(FlowError::AlreadySubmitted));
        assert_eq!(store.fetch_all().await.len(), 1);
    }
}
