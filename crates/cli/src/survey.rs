//! `feedback survey` -- fill in the feedback form at the terminal.
//!
//! Walks the six pages in order. Each page's questions are asked one by one;
//! pressing Enter keeps the value shown in brackets. A page that fails
//! validation is asked again with the reason printed above it.
//!
//! At any prompt `:back` returns to the previous page and `:quit` abandons
//! the form without saving.

use std::io::{self, BufRead, Write};

use feedback_core::pages::{FIVE_POINT, TEN_POINT, YEAR_OPTIONS};
use feedback_core::{FlowError, FormInputs, FormSession, Page, RecordStore, SubmitReceipt};

const CREDIT_ALLOCATION: &[&str] = &["appropriate", "too-high", "too-low"];
const RECOMMEND: &[&str] = &["yes", "no", "maybe"];

/// How a survey run ended.
#[derive(Debug)]
pub(crate) enum SurveyOutcome {
    Submitted(SubmitReceipt),
    Abandoned,
}

/// What the respondent asked for while answering a page.
enum Step {
    Answered,
    Back,
    Quit,
}

enum Answer {
    Value(String),
    Keep,
    Back,
    Quit,
}

struct Prompter<'a, R, W> {
    reader: &'a mut R,
    writer: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    /// Read one answer. End of input counts as `:quit`.
    fn ask(&mut self, label: &str, current: &str) -> io::Result<Answer> {
        if current.is_empty() {
            write!(self.writer, "  {}: ", label)?;
        } else {
            write!(self.writer, "  {} [{}]: ", label, current)?;
        }
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            writeln!(self.writer)?;
            return Ok(Answer::Quit);
        }
        let value = line.trim_end_matches(['\r', '\n']);
        Ok(match value.trim() {
            ":back" => Answer::Back,
            ":quit" | ":q" => Answer::Quit,
            "" => Answer::Keep,
            _ => Answer::Value(value.to_string()),
        })
    }

    fn text(&mut self, label: &str, slot: &mut String) -> io::Result<Option<Step>> {
        Ok(match self.ask(label, slot)? {
            Answer::Value(v) => {
                *slot = v;
                None
            }
            Answer::Keep => None,
            Answer::Back => Some(Step::Back),
            Answer::Quit => Some(Step::Quit),
        })
    }

    /// A fixed list of options. Accepts the option's number or its text.
    fn choice(
        &mut self,
        label: &str,
        options: &[&str],
        slot: &mut Option<String>,
    ) -> io::Result<Option<Step>> {
        let listing: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, o)| format!("{}) {}", i + 1, o))
            .collect();
        let label = format!("{} ({})", label, listing.join("  "));
        let current = slot.clone().unwrap_or_default();
        Ok(match self.ask(&label, &current)? {
            Answer::Value(v) => {
                let picked = v
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| options.get(i))
                    .map(|o| o.to_string())
                    .unwrap_or(v);
                *slot = Some(picked);
                None
            }
            Answer::Keep => None,
            Answer::Back => Some(Step::Back),
            Answer::Quit => Some(Step::Quit),
        })
    }

    /// A rating with no initial selection.
    fn rating(
        &mut self,
        label: &str,
        (min, max): (u8, u8),
        slot: &mut Option<u8>,
    ) -> io::Result<Option<Step>> {
        let label = format!("{} ({}-{})", label, min, max);
        let current = slot.map(|v| v.to_string()).unwrap_or_default();
        Ok(match self.ask(&label, &current)? {
            Answer::Value(v) => {
                // Unparseable input clears the selection so validation names it.
                *slot = v.trim().parse().ok();
                None
            }
            Answer::Keep => None,
            Answer::Back => Some(Step::Back),
            Answer::Quit => Some(Step::Quit),
        })
    }

    /// A slider; always holds a value.
    fn slider(
        &mut self,
        label: &str,
        (min, max): (u8, u8),
        slot: &mut u8,
    ) -> io::Result<Option<Step>> {
        let label = format!("{} ({}-{})", label, min, max);
        let current = slot.to_string();
        Ok(match self.ask(&label, &current)? {
            Answer::Value(v) => {
                match v.trim().parse::<u8>() {
                    Ok(n) => *slot = n.clamp(min, max),
                    Err(_) => writeln!(self.writer, "    (keeping {})", slot)?,
                }
                None
            }
            Answer::Keep => None,
            Answer::Back => Some(Step::Back),
            Answer::Quit => Some(Step::Quit),
        })
    }
}

/// Ask every question on `page`, stopping early on `:back` or `:quit`.
fn fill_page<R: BufRead, W: Write>(
    p: &mut Prompter<'_, R, W>,
    page: Page,
    inputs: &mut FormInputs,
) -> io::Result<Step> {
    macro_rules! ask {
        ($e:expr) => {
            if let Some(step) = $e? {
                return Ok(step);
            }
        };
    }

    match page {
        Page::Identity => {
            ask!(p.text("Full name", &mut inputs.student_name));
            ask!(p.text("Student ID", &mut inputs.student_id));
            ask!(p.text("Program", &mut inputs.program));
            let mut year = Some(inputs.year.clone()).filter(|y| !y.is_empty());
            ask!(p.choice("Year", &YEAR_OPTIONS, &mut year));
            inputs.year = year.unwrap_or_default();
        }
        Page::Course => {
            ask!(p.rating("Course relevance", TEN_POINT, &mut inputs.course_relevance));
            ask!(p.choice("Credit allocation", CREDIT_ALLOCATION, &mut inputs.credit_allocation));
            ask!(p.slider("Content depth", TEN_POINT, &mut inputs.content_depth));
        }
        Page::Teaching => {
            ask!(p.rating("Instructor knowledge", FIVE_POINT, &mut inputs.instructor_knowledge));
            ask!(p.slider("Clarity of instruction", TEN_POINT, &mut inputs.clarity_of_instruction));
        }
        Page::Facilities => {
            ask!(p.slider("Library", TEN_POINT, &mut inputs.library_rating));
            ask!(p.rating("Campus facilities", FIVE_POINT, &mut inputs.facilities_rating));
            ask!(p.slider("Labs & washrooms", TEN_POINT, &mut inputs.labs_wash_rating));
        }
        Page::Overall => {
            ask!(p.rating("Overall satisfaction", TEN_POINT, &mut inputs.overall_satisfaction));
            ask!(p.choice("Would you recommend us?", RECOMMEND, &mut inputs.recommend));
        }
        Page::Comments => {
            ask!(p.text("Additional comments (optional)", &mut inputs.additional_comments));
        }
        Page::Start | Page::ThankYou => {}
    }
    Ok(Step::Answered)
}

/// Run the interactive survey against `store`.
pub(crate) async fn run_survey<S, R, W>(
    store: &S,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<SurveyOutcome>
where
    S: RecordStore + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut session = FormSession::new();
    let mut inputs = FormInputs::default();

    writeln!(writer)?;
    writeln!(writer, "  Student Feedback Survey")?;
    writeln!(writer, "  Six short pages. Enter keeps the value in brackets.")?;
    writeln!(writer, "  Type :back for the previous page or :quit to leave.")?;

    // Leaving the start page never needs validation.
    session.go_to(1, &inputs).map_err(io::Error::other)?;

    loop {
        let page = session.current_page();
        writeln!(writer)?;
        writeln!(
            writer,
            "Page {} of {}: {}   [{} done]",
            page.number(),
            feedback_core::PAGE_COUNT,
            page.title(),
            session.progress()
        )?;

        let step = {
            let mut prompter = Prompter {
                reader: &mut *reader,
                writer: &mut *writer,
            };
            fill_page(&mut prompter, page, &mut inputs)?
        };

        match step {
            Step::Quit => {
                session.reset();
                writeln!(writer, "Survey abandoned; nothing was saved.")?;
                return Ok(SurveyOutcome::Abandoned);
            }
            Step::Back => {
                if page.number() > 1 {
                    session
                        .go_to(page.number() - 1, &inputs)
                        .map_err(io::Error::other)?;
                }
            }
            Step::Answered if page == Page::Comments => {
                match session.submit(&inputs, store).await {
                    Ok(receipt) => {
                        writeln!(writer)?;
                        writeln!(writer, "Thank you! Your feedback has been recorded.")?;
                        if !receipt.durable {
                            writeln!(
                                writer,
                                "There was an error saving your feedback. Your response has been kept locally for this session."
                            )?;
                        }
                        return Ok(SurveyOutcome::Submitted(receipt));
                    }
                    Err(FlowError::IncompletePages { missing }) => {
                        writeln!(writer, "  ! Pages {:?} still need answers.", missing)?;
                        if let Some(first) = missing.first() {
                            session.go_to(*first, &inputs).map_err(io::Error::other)?;
                        }
                    }
                    Err(e) => writeln!(writer, "  ! {}", e)?,
                }
            }
            Step::Answered => {
                if let Err(e) = session.go_to(page.number() + 1, &inputs) {
                    writeln!(writer, "  ! {}", e)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use feedback_storage::{KvRecordStore, MemoryKv};

    use super::*;

    fn store() -> KvRecordStore {
        KvRecordStore::new(Arc::new(MemoryKv::new()))
    }

    async fn run(script: &str, store: &KvRecordStore) -> (SurveyOutcome, String) {
        let mut reader = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let outcome = run_survey(store, &mut reader, &mut out).await.unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    const COMPLETE: &str = "Asha Rao\nIIPS-42\nMCA\n2\n\
                            8\n1\n\n\
                            4\n7\n\
                            \n3\n\n\
                            9\n1\n\
                            Great term\n";

    #[tokio::test]
    async fn complete_run_submits_one_record() {
        let store = store();
        let (outcome, transcript) = run(COMPLETE, &store).await;

        let SurveyOutcome::Submitted(receipt) = outcome else {
            panic!("expected submission");
        };
        assert!(receipt.durable);
        assert_eq!(receipt.record.student_name, "Asha Rao");
        assert_eq!(receipt.record.credit_allocation, "appropriate");
        assert_eq!(receipt.record.content_depth, 5);
        assert_eq!(receipt.record.recommend.as_str(), "yes");
        assert!(transcript.contains("Thank you!"));

        let saved = store.fetch_all().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].additional_comments, "Great term");
    }

    #[tokio::test]
    async fn blank_identity_is_asked_again() {
        let store = store();
        let script = format!("\n\n\n\n{}", COMPLETE);
        let (outcome, transcript) = run(&script, &store).await;
        assert!(transcript.contains("Please fill in all required fields."));
        assert!(matches!(outcome, SurveyOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn back_keeps_earlier_answers() {
        let store = store();
        let script = "Asha\nS1\nMBA\n3\n:back\n\n\n\n\n8\n2\n\n4\n\n\n2\n\n6\n3\n\n";
        let (outcome, _) = run(script, &store).await;
        let SurveyOutcome::Submitted(receipt) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(receipt.record.student_name, "Asha");
        assert_eq!(receipt.record.year, "3");
        assert_eq!(receipt.record.credit_allocation, "too-high");
        assert_eq!(receipt.record.additional_comments, "No additional comments");
    }

    #[tokio::test]
    async fn unlisted_year_is_asked_again() {
        let store = store();
        let script = "Asha Rao\nIIPS-42\nMCA\n9\n\
                      \n\n\n2\n\
                      8\n1\n\n\
                      4\n7\n\
                      \n3\n\n\
                      9\n1\n\
                      Great term\n";
        let (outcome, transcript) = run(script, &store).await;
        assert!(transcript.contains("'9' is not a valid choice for year"));
        let SurveyOutcome::Submitted(receipt) = outcome else {
            panic!("expected submission");
        };
        assert_eq!(receipt.record.year, "2");
    }

    #[tokio::test]
    async fn quit_saves_nothing() {
        let store = store();
        let (outcome, transcript) = run("Asha\n:quit\n", &store).await;
        assert!(matches!(outcome, SurveyOutcome::Abandoned));
        assert!(transcript.contains("nothing was saved"));
        assert!(store.fetch_all().await.is_empty());
    }

    #[tokio::test]
    async fn end_of_input_abandons() {
        let store = store();
        let (outcome, _) = run("Asha\nS1\n", &store).await;
        assert!(matches!(outcome, SurveyOutcome::Abandoned));
    }

    #[tokio::test]
    async fn unavailable_store_still_thanks_respondent() {
        let store = KvRecordStore::volatile();
        let (outcome, transcript) = run(COMPLETE, &store).await;
        let SurveyOutcome::Submitted(receipt) = outcome else {
            panic!("expected submission");
        };
        assert!(!receipt.durable);
        assert!(transcript.contains("kept locally"));
    }
}
