// Error taxonomy for the survey library.
//
// The app boundary (main / TUI) wraps these in `anyhow` with context; inside
// the library every fallible operation returns a typed `SurveyError` so the
// frontend can distinguish recoverable conditions from fatal ones.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    /// Consent-gate failure. Recoverable: the respondent stays on the same
    /// step and may correct and retry.
    #[error("{0}")]
    Validation(String),

    /// Submit attempted with no answered questions. Blocks only the submit
    /// action; nothing is persisted and navigation does not advance.
    #[error("cannot submit: no complete responses were recorded")]
    EmptySubmission,

    /// Questionnaire/schema invariant violation (bad label, duplicate path,
    /// non-group section, empty option list). Fatal at startup.
    #[error("invalid questionnaire definition: {0}")]
    Configuration(String),

    /// I/O failure while appending to or reading the response table.
    /// Recoverable: the submission is not considered complete and the
    /// respondent may retry from the review step.
    #[error("response table I/O failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// Session step index outside the valid range. Self-healing: the session
    /// resets to the consent step and session-scoped state is cleared.
    #[error("session step index {found} is out of range; survey restarted")]
    StateCorruption { found: usize },
}

impl SurveyError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SurveyError::Configuration(_))
    }
}
