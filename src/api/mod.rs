//! Operations the frontend layers (TUI, CLI) drive.

pub mod export;
pub mod session;

pub use session::{ReviewRow, SurveySession};
