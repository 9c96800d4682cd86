//! Export operations offered from the confirmation screen and the CLI.

use crate::error::SurveyError;
use crate::storage::{csv_row, ResponseTable};
use crate::submission::{export_file_name, SubmissionRecord};
use log::info;
use std::path::{Path, PathBuf};

/// The just-submitted record as a one-row CSV, in its original flattened
/// order (not reindexed to the full schema).
pub fn individual_csv(record: &SubmissionRecord) -> String {
    let headers: Vec<&str> = record.fields().map(|(k, _)| k).collect();
    let values: Vec<&str> = record.fields().map(|(_, v)| v).collect();
    let mut out = csv_row(&headers);
    out.push_str(&csv_row(&values));
    out
}

/// Write the individual export into `dir`, named after the respondent.
pub fn write_individual(
    record: &SubmissionRecord,
    dir: &Path,
) -> Result<PathBuf, SurveyError> {
    std::fs::create_dir_all(dir)?;
    let file_name = export_file_name(record, chrono::Local::now().naive_local());
    let path = dir.join(file_name);
    std::fs::write(&path, individual_csv(record))?;
    info!(
        "[PHASE: export] [STEP: individual] Wrote {:?}",
        path
    );
    Ok(path)
}

/// Copy the whole response table to `dest`, verbatim. Returns `None` when no
/// submission has been recorded yet ("not yet available", not an error).
pub fn write_bulk(table: &ResponseTable, dest: &Path) -> Result<Option<PathBuf>, SurveyError> {
    let Some(contents) = table.read_all()? else {
        return Ok(None);
    };
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(dest, contents)?;
    info!("[PHASE: export] [STEP: bulk] Wrote {:?}", dest);
    Ok(Some(dest.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::QuestionPath;
    use crate::session::store::{AnswerValue, ResponseStore};
    use crate::submission::build_record;

    fn record() -> SubmissionRecord {
        let mut store = ResponseStore::new();
        store.set(
            QuestionPath::root("A").unwrap().child("Q1").unwrap(),
            AnswerValue::Text("Pune, Mulshi".into()),
        );
        build_record(&store).unwrap()
    }

    #[test]
    fn individual_csv_has_header_and_one_row() {
        let csv = individual_csv(&record());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("A|Q1,submission_id,submission_timestamp"));
        assert!(lines[1].starts_with("\"Pune, Mulshi\","));
    }

    #[test]
    fn individual_export_lands_in_the_requested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_individual(&record(), dir.path()).unwrap();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".csv"));
    }

    #[test]
    fn bulk_export_of_a_missing_table_is_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let table = ResponseTable::new(dir.path().join("responses.csv"));
        let dest = dir.path().join("all.csv");
        assert_eq!(write_bulk(&table, &dest).unwrap(), None);
        assert!(!dest.exists());
    }
}
