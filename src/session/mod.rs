//! Session state: the respondent's step position and answers.
//!
//! The step is stored as a raw index so the whole session state is a plain
//! serializable value; decoding an out-of-range index is how corrupt state is
//! detected (and healed) rather than crashed on.

pub mod store;

use crate::error::SurveyError;
use crate::questionnaire::QuestionPath;
use crate::submission::SubmissionRecord;
use serde::{Deserialize, Serialize};
use store::{AnswerValue, ResponseStore};

/// Form actions that may change the step. These transitions are the only
/// place the step mutates; rendering never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Back,
    Submit,
    StartNewSurvey,
}

/// Decoded step position. `Section` is 1-based, matching "Part i of N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Consent,
    Section(usize),
    Review,
    Confirmation,
}

impl Step {
    pub fn from_index(index: usize, section_count: usize) -> Option<Step> {
        match index {
            0 => Some(Step::Consent),
            i if (1..=section_count).contains(&i) => Some(Step::Section(i)),
            i if i == section_count + 1 => Some(Step::Review),
            i if i == section_count + 2 => Some(Step::Confirmation),
            _ => None,
        }
    }

    pub fn index(&self, section_count: usize) -> usize {
        match self {
            Step::Consent => 0,
            Step::Section(i) => *i,
            Step::Review => section_count + 1,
            Step::Confirmation => section_count + 2,
        }
    }

    /// Whether the Back control is shown at all. Section 1 has no Back: the
    /// consent step is not re-enterable once the survey has started.
    pub fn can_go_back(&self) -> bool {
        matches!(self, Step::Section(i) if *i > 1) || matches!(self, Step::Review)
    }
}

/// The whole session-scoped mutable state, owned and serializable. The
/// immutable questionnaire and schema are deliberately not part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub step_index: usize,
    pub responses: ResponseStore,
    /// Snapshot of the last submitted record, kept only for the confirmation
    /// screen's individual export.
    pub current_submission: Option<SubmissionRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything session-scoped and return to the consent step.
    pub fn reset(&mut self) {
        self.step_index = 0;
        self.responses.clear();
        self.current_submission = None;
    }
}

/// Consent-gate check for leaving the consent step: consent must be "Yes"
/// and the respondent's signature non-empty.
pub fn consent_gate(store: &ResponseStore) -> Result<(), SurveyError> {
    let consent = QuestionPath::root("Consent to fill the form")?;
    let signature = QuestionPath::root("Signature of the respondent")?;

    let consented = matches!(
        store.get(&consent),
        Some(AnswerValue::One(v)) if v == "Yes"
    );
    let signed = matches!(
        store.get(&signature),
        Some(AnswerValue::Text(v)) if !v.trim().is_empty()
    );

    if consented && signed {
        Ok(())
    } else {
        Err(SurveyError::Validation(
            "Consent and the respondent's signature are required to start the survey.".to_string(),
        ))
    }
}
