//! Submission pipeline: filter, flatten, stamp, reindex.
//!
//! A record is built exactly once per submit action. Empty answers are
//! dropped, list answers are joined into display strings, and the record is
//! stamped with a fresh submission id and a capture timestamp that never
//! decreases within the process.

use crate::error::SurveyError;
use crate::schema::{Schema, SUBMISSION_ID, SUBMISSION_TIMESTAMP};
use crate::session::store::ResponseStore;
use crate::utils::validation::sanitize_export_name;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// Fallback stem for the individual export when the respondent never filled
/// in their name.
const DEFAULT_RESPONDENT: &str = "TNS_Respondent";

/// The flattened record of one submission, in first-bound answer order plus
/// the two generated fields. This is what the confirmation screen exports;
/// the persisted row is the same record reindexed against the schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    fields: IndexMap<String, String>,
}

impl SubmissionRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.get(SUBMISSION_ID)
    }

    pub fn submission_timestamp(&self) -> Option<&str> {
        self.get(SUBMISSION_TIMESTAMP)
    }

    /// Project the record onto the full schema, blank for absent columns, so
    /// every persisted row has the identical column order.
    pub fn reindex<'a>(&'a self, schema: &'a Schema) -> Vec<&'a str> {
        schema
            .columns()
            .iter()
            .map(|column| self.get(column).unwrap_or(""))
            .collect()
    }

    /// The respondent's display name, for the export file name.
    pub fn respondent_name(&self) -> &str {
        self.fields
            .iter()
            .find(|(k, _)| k.ends_with("|Name of the respondent"))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_RESPONDENT)
    }
}

/// Build the submission record from the current response store.
///
/// Fails with [`SurveyError::EmptySubmission`] when nothing non-empty was
/// entered; the caller must not persist or advance in that case.
pub fn build_record(store: &ResponseStore) -> Result<SubmissionRecord, SurveyError> {
    let mut fields: IndexMap<String, String> = IndexMap::new();
    for (path, value) in store.non_empty() {
        fields.insert(path.as_str().to_string(), value.flatten());
    }
    if fields.is_empty() {
        return Err(SurveyError::EmptySubmission);
    }

    let id = Uuid::new_v4().to_string();
    fields.insert(SUBMISSION_ID.to_string(), id.clone());
    fields.insert(SUBMISSION_TIMESTAMP.to_string(), next_timestamp());

    info!(
        "[PHASE: submission] [STEP: build] Record built (fields={}, submission_id={})",
        fields.len(),
        id
    );
    Ok(SubmissionRecord { fields })
}

// Capture timestamps must sort in submission order even if the wall clock
// steps backwards mid-session, so each issued value is clamped to the last.
static LAST_TIMESTAMP: Mutex<Option<NaiveDateTime>> = Mutex::new(None);

fn next_timestamp() -> String {
    let now = chrono::Local::now().naive_local();
    let mut last = LAST_TIMESTAMP
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let issued = match *last {
        Some(prev) if prev > now => prev,
        _ => now,
    };
    *last = Some(issued);
    issued.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// File name for the individual download: sanitized respondent name plus the
/// capture moment.
pub fn export_file_name(record: &SubmissionRecord, now: NaiveDateTime) -> String {
    let mut stem = sanitize_export_name(record.respondent_name());
    if stem.is_empty() {
        stem = DEFAULT_RESPONDENT.to_string();
    }
    format!("{}_Response_{}.csv", stem, now.format("%Y%m%d_%H%M%S"))
}
