//! In-session response store: the authoritative answers map until submission.

use crate::questionnaire::QuestionPath;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Join string for flattening multi-select answers into one display string.
pub const LIST_JOIN: &str = "; ";

/// One stored answer. The variant mirrors the leaf's input kind; remarks are
/// plain `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    Text(String),
    Date(NaiveDate),
    One(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Empty answers are dropped at submission time and never persisted.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) | AnswerValue::One(s) => s.is_empty(),
            AnswerValue::Date(_) => false,
            AnswerValue::Many(items) => items.is_empty(),
        }
    }

    /// Flatten to the persisted display string. Lossy for `Many`: the list
    /// structure is not recoverable from the joined form.
    pub fn flatten(&self) -> String {
        match self {
            AnswerValue::Text(s) | AnswerValue::One(s) => s.clone(),
            AnswerValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            AnswerValue::Many(items) => items.join(LIST_JOIN),
        }
    }
}

/// Mapping from question path to the respondent's current answer.
///
/// Entries are created or overwritten each time their screen is rendered
/// (write-through binding) and survive Back/Next navigation untouched; only a
/// whole-session reset clears the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseStore {
    entries: IndexMap<QuestionPath, AnswerValue>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: QuestionPath, value: AnswerValue) {
        self.entries.insert(path, value);
    }

    pub fn get(&self, path: &QuestionPath) -> Option<&AnswerValue> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when nothing submittable has been entered (no entries, or only
    /// empty ones).
    pub fn is_all_empty(&self) -> bool {
        self.entries.values().all(AnswerValue::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionPath, &AnswerValue)> {
        self.entries.iter()
    }

    /// Entries that survive the submission filter, in first-bound order.
    pub fn non_empty(&self) -> impl Iterator<Item = (&QuestionPath, &AnswerValue)> {
        self.entries.iter().filter(|(_, v)| !v.is_empty())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
