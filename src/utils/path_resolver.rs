use anyhow::Result;
use std::path::PathBuf;

const DATA_FOLDER: &str = "AssessmentData";
const LOG_FOLDER: &str = "Assessment_Wizard_Log";

/// Resolve the folder holding the accumulating response table (absolute path).
///
/// Strategy:
/// - Walk up from CWD looking for an existing `AssessmentData/` so repeated
///   runs from nested directories keep appending to one table.
/// - Otherwise create `<cwd>/AssessmentData`.
/// - Fallback: the platform-local data dir (e.g. `~/.local/share`).
pub fn resolve_data_folder() -> Result<PathBuf> {
    if let Ok(mut dir) = std::env::current_dir() {
        let mut probe = dir.clone();
        for _ in 0..12 {
            let candidate = probe.join(DATA_FOLDER);
            if candidate.exists() {
                return Ok(candidate);
            }
            if let Some(parent) = probe.parent() {
                probe = parent.to_path_buf();
            } else {
                break;
            }
        }

        dir = dir.join(DATA_FOLDER);
        if std::fs::create_dir_all(&dir).is_ok() {
            return Ok(dir);
        }
    }

    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("No local data directory available on this platform"))?;
    let data_dir = base.join("assessment-wizard").join(DATA_FOLDER);
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data folder: {}", e))?;
    Ok(data_dir)
}

/// Resolve log folder (absolute path)
pub fn resolve_log_folder() -> Result<PathBuf> {
    // Same walk-up strategy as the data folder: when running from nested
    // directories we must not scatter `Assessment_Wizard_Log/` copies around.
    if let Ok(mut dir) = std::env::current_dir() {
        for _ in 0..12 {
            let candidate = dir.join(LOG_FOLDER);
            if candidate.exists() {
                return Ok(candidate);
            }
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            } else {
                break;
            }
        }
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let log_dir = cwd.join(LOG_FOLDER);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}
