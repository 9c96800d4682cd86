//! The survey session: the operation surface a frontend drives.
//!
//! Owns the session-scoped state and the response table handle; the
//! questionnaire and schema are built once at startup and injected. All step
//! mutation happens in [`SurveySession::advance`]; rendering and answer
//! binding never move the step.

use crate::error::SurveyError;
use crate::questionnaire::{QuestionNode, QuestionPath, Questionnaire};
use crate::schema::Schema;
use crate::session::store::AnswerValue;
use crate::session::{consent_gate, Action, SessionState, Step};
use crate::storage::ResponseTable;
use crate::submission::{build_record, SubmissionRecord};
use log::{info, warn};
use std::sync::Arc;

/// One row of the review screen: bare question label and flattened response.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub question: String,
    pub response: String,
}

pub struct SurveySession {
    questionnaire: Arc<Questionnaire>,
    schema: Arc<Schema>,
    table: ResponseTable,
    state: SessionState,
    notice: Option<String>,
}

impl SurveySession {
    pub fn new(
        questionnaire: Arc<Questionnaire>,
        schema: Arc<Schema>,
        table: ResponseTable,
    ) -> Self {
        SurveySession {
            questionnaire,
            schema,
            table,
            state: SessionState::new(),
            notice: None,
        }
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn table(&self) -> &ResponseTable {
        &self.table
    }

    pub fn section_count(&self) -> usize {
        self.questionnaire.section_count()
    }

    /// Current step, healing corrupt state first: an out-of-range index
    /// resets the session to the consent step and leaves a notice.
    pub fn step(&mut self) -> Step {
        let n = self.section_count();
        match Step::from_index(self.state.step_index, n) {
            Some(step) => step,
            None => {
                let found = self.state.step_index;
                warn!(
                    "[PHASE: session] [STEP: heal] Step index {} out of range 0..={}, restarting survey",
                    found,
                    n + 2
                );
                self.state.reset();
                self.notice = Some(
                    SurveyError::StateCorruption { found }.to_string(),
                );
                Step::Consent
            }
        }
    }

    /// The section under the current step, if any: `(index, label, subtree)`.
    pub fn current_section(&mut self) -> Option<(usize, &str, &QuestionNode)> {
        match self.step() {
            Step::Section(i) => {
                let (label, node) = self.questionnaire.section(i)?;
                Some((i, label, node))
            }
            _ => None,
        }
    }

    /// Bind an answer. Callers write through on every edit, so navigation can
    /// never lose a value.
    pub fn set_answer(&mut self, path: QuestionPath, value: AnswerValue) {
        if log::log_enabled!(log::Level::Debug) {
            let shown = if crate::utils::logging::is_sensitive_path(path.as_str()) {
                crate::utils::logging::mask_sensitive(&value.flatten())
            } else {
                value.flatten()
            };
            log::debug!(
                "[PHASE: session] [STEP: bind] {} = {}",
                path,
                shown
            );
        }
        self.state.responses.set(path, value);
    }

    pub fn answer(&self, path: &QuestionPath) -> Option<&AnswerValue> {
        self.state.responses.get(path)
    }

    pub fn responses(&self) -> &crate::session::store::ResponseStore {
        &self.state.responses
    }

    /// Non-empty answers in first-bound order, flattened for display.
    pub fn review_snapshot(&self) -> Vec<ReviewRow> {
        self.state
            .responses
            .non_empty()
            .map(|(path, value)| ReviewRow {
                question: path.leaf_label().to_string(),
                response: value.flatten(),
            })
            .collect()
    }

    /// The last submitted record, available on the confirmation step.
    pub fn current_submission(&self) -> Option<&SubmissionRecord> {
        self.state.current_submission.as_ref()
    }

    /// Informational notice left by self-healing; cleared on read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Apply a form action. Returns the step after the transition; on a
    /// recoverable error the step is unchanged and the error describes what
    /// to surface. Unknown (step, action) pairs are logged no-ops.
    pub fn advance(&mut self, action: Action) -> Result<Step, SurveyError> {
        let step = self.step();
        let n = self.section_count();

        let next = match (step, action) {
            (Step::Consent, Action::Next) => {
                consent_gate(&self.state.responses)?;
                Step::Section(1)
            }
            (Step::Section(i), Action::Next) if i < n => Step::Section(i + 1),
            (Step::Section(i), Action::Next) if i == n => Step::Review,
            (Step::Section(i), Action::Back) if i > 1 => Step::Section(i - 1),
            (Step::Section(1), Action::Back) => step,
            (Step::Review, Action::Back) => Step::Section(n),
            (Step::Review, Action::Submit) => {
                self.submit()?;
                Step::Confirmation
            }
            (Step::Confirmation, Action::StartNewSurvey) => {
                self.reset_session();
                Step::Consent
            }
            (unchanged, other) => {
                log::debug!(
                    "[PHASE: session] [STEP: advance] Ignoring {:?} at {:?}",
                    other,
                    unchanged
                );
                unchanged
            }
        };

        if next != step {
            self.state.step_index = next.index(n);
            info!(
                "[PHASE: session] [STEP: advance] {:?} --{:?}--> {:?}",
                step, action, next
            );
        }
        Ok(next)
    }

    /// Run the submission pipeline. Only a fully persisted record advances
    /// anything: on any failure the store, the table and the step are as
    /// before. `advance(Action::Submit)` is the normal entry; calling this
    /// directly submits without moving the step.
    pub fn submit(&mut self) -> Result<(), SurveyError> {
        let record = build_record(&self.state.responses)?;
        self.table.append(&self.schema, &record)?;
        info!(
            "[PHASE: submission] [STEP: complete] Persisted submission {}",
            record.submission_id().unwrap_or("?")
        );
        self.state.current_submission = Some(record);
        Ok(())
    }

    /// Discard all session-scoped state and return to the consent step. The
    /// questionnaire and schema are immutable and survive.
    pub fn reset_session(&mut self) {
        info!("[PHASE: session] [STEP: reset] Starting a new survey");
        self.state.reset();
    }

    #[cfg(test)]
    pub(crate) fn corrupt_step_for_test(&mut self, index: usize) {
        self.state.step_index = index;
    }
}
