//! The persistent response table: an append-only CSV file.
//!
//! The header row is the full derived schema and is written only when the
//! file is absent or empty; every data row is one submission reindexed to
//! that header. Appends are single-write so a failed submission never leaves
//! a partial row behind (row-level atomicity is the host filesystem's).

use crate::error::SurveyError;
use crate::schema::Schema;
use crate::submission::SubmissionRecord;
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Quote one CSV field when it contains a delimiter, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Join fields into one terminated CSV row.
pub fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut out = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    out
}

#[derive(Debug, Clone)]
pub struct ResponseTable {
    path: PathBuf,
}

impl ResponseTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ResponseTable { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one submission as a single row, writing the header first only
    /// if the table does not exist yet or is empty.
    pub fn append(&self, schema: &Schema, record: &SubmissionRecord) -> Result<(), SurveyError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let mut buffer = String::new();
        if needs_header {
            buffer.push_str(&csv_row(schema.columns()));
        }
        buffer.push_str(&csv_row(&record.reindex(schema)));

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;
        file.flush()?;

        info!(
            "[PHASE: submission] [STEP: persist] Appended row to {:?} (header={})",
            self.path, needs_header
        );
        Ok(())
    }

    /// The whole table, verbatim, for bulk export. `None` when no submission
    /// has been recorded yet (a notice for the caller, not an error).
    pub fn read_all(&self) -> Result<Option<String>, SurveyError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "[PHASE: export] [STEP: bulk] Response table {:?} not yet available",
                    self.path
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{QuestionPath, Questionnaire};
    use crate::session::store::{AnswerValue, ResponseStore};
    use crate::submission::build_record;

    fn fixture() -> (Questionnaire, Schema) {
        let q = Questionnaire::from_json(
            r#"{"A": {"Q1": ["x", "y"], "Notes": null}}"#,
        )
        .unwrap();
        let schema = Schema::derive(&q).unwrap();
        (q, schema)
    }

    fn record_with(answer: &str) -> SubmissionRecord {
        let mut store = ResponseStore::new();
        store.set(
            QuestionPath::root("A").unwrap().child("Q1").unwrap(),
            AnswerValue::One(answer.into()),
        );
        build_record(&store).unwrap()
    }

    #[test]
    fn field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn header_written_exactly_once_across_appends() {
        let (_q, schema) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let table = ResponseTable::new(dir.path().join("responses.csv"));

        table.append(&schema, &record_with("x")).unwrap();
        table.append(&schema, &record_with("y")).unwrap();

        let contents = table.read_all().unwrap().expect("table exists");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Consent to fill the form,"));
        assert!(lines[0].ends_with("submission_id,submission_timestamp"));
        assert!(!lines[1].starts_with("Consent to fill the form"));
        assert!(!lines[2].starts_with("Consent to fill the form"));
    }

    #[test]
    fn header_rewritten_when_file_exists_but_is_empty() {
        let (_q, schema) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.csv");
        std::fs::write(&path, "").unwrap();

        let table = ResponseTable::new(&path);
        table.append(&schema, &record_with("x")).unwrap();
        let contents = table.read_all().unwrap().unwrap();
        assert!(contents.starts_with("Consent to fill the form,"));
    }

    #[test]
    fn row_width_matches_schema() {
        let (_q, schema) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let table = ResponseTable::new(dir.path().join("responses.csv"));
        table.append(&schema, &record_with("plain")).unwrap();

        let contents = table.read_all().unwrap().unwrap();
        let data_row = contents.lines().nth(1).unwrap();
        // No quoted fields in this fixture row, so commas are separators.
        assert_eq!(data_row.split(',').count(), schema.len());
    }

    #[test]
    fn answers_with_commas_survive_quoting() {
        let (_q, schema) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let table = ResponseTable::new(dir.path().join("responses.csv"));

        let mut store = ResponseStore::new();
        store.set(
            QuestionPath::root("A").unwrap().child("Notes").unwrap(),
            AnswerValue::Text("Pune, Mulshi, \"west\"".into()),
        );
        let record = build_record(&store).unwrap();
        table.append(&schema, &record).unwrap();

        let contents = table.read_all().unwrap().unwrap();
        assert!(contents.contains("\"Pune, Mulshi, \"\"west\"\"\""));
    }

    #[test]
    fn missing_table_reads_as_not_yet_available() {
        let dir = tempfile::tempdir().unwrap();
        let table = ResponseTable::new(dir.path().join("nope.csv"));
        assert_eq!(table.read_all().unwrap(), None);
    }
}
