// Application configuration
//
// Optional `assessment.toml` next to the working directory plus
// `ASSESSMENT_*` environment overrides (e.g. ASSESSMENT_DATA_DIR). Everything
// has a usable default so the wizard runs with no config at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_TABLE_FILE: &str = "self_assessment_TNS_responses.csv";
pub const DEFAULT_TITLE: &str = "Project Ksheersagar – TNS Self-Assessment";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Folder holding the response table and exports; resolved automatically
    /// when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    pub table_file: String,
    pub survey_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: None,
            table_file: DEFAULT_TABLE_FILE.to_string(),
            survey_title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("table_file", DEFAULT_TABLE_FILE)?
            .set_default("survey_title", DEFAULT_TITLE)?
            .add_source(config::File::with_name("assessment").required(false))
            .add_source(config::Environment::with_prefix("ASSESSMENT"))
            .build()
            .context("Failed to read configuration")?;
        cfg.try_deserialize()
            .context("Invalid configuration values")
    }

    /// Absolute path of the response table.
    pub fn table_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create data dir {:?}", dir))?;
                dir.clone()
            }
            None => crate::utils::path_resolver::resolve_data_folder()?,
        };
        Ok(dir.join(&self.table_file))
    }

    /// Folder where confirmation-screen exports are written.
    pub fn export_dir(&self) -> Result<PathBuf> {
        Ok(self
            .table_path()?
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")))
    }
}
