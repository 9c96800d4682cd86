// Project Ksheersagar - TNS Self-Assessment
// Main library entry point

pub mod api;
pub mod config;
pub mod error;
pub mod questionnaire;
pub mod render;
pub mod schema;
pub mod session;
pub mod storage;
pub mod submission;
pub mod tui;
pub mod utils;

use anyhow::{Context, Result};
use log::{error, info};

/// Initialize logging system with dual format (JSON + human-readable)
///
/// Stdout logging is optional: the TUI disables it so log lines cannot
/// corrupt the terminal UI.
pub fn init_logging(with_stdout: bool) -> Result<()> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");

    // JSON log file for structured parsing
    let json_log_file = log_dir.join(format!("assessment-{}.log", timestamp));

    // Human-readable log file (.txt)
    let txt_log_file = log_dir.join(format!("assessment-{}.txt", timestamp));

    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}", txt_line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let json_line = utils::logging::format_json_log(
                        &timestamp_utc,
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", json_line));
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let message_str = format!("{}", message);
                    let (phase, step, cleaned_message) =
                        utils::logging::parse_log_metadata(&message_str);
                    let txt_line = utils::logging::format_human_readable_log(
                        &timestamp_local.to_string(),
                        record.level(),
                        record.target(),
                        &cleaned_message,
                        phase.as_deref(),
                        step.as_deref(),
                    );
                    out.finish(format_args!("{}\n", txt_line));
                })
                .chain(fern::log_file(txt_log_file)?),
        );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Run the interactive terminal wizard.
pub fn run_tui() -> Result<()> {
    let config = config::AppConfig::load()?;
    tui::run(&config).map_err(|e| {
        error!("[PHASE: tui] [STEP: fatal] Wizard failed: {:#}", e);
        e
    })
}

/// Render one frame of a wizard page on an in-memory backend and exit.
/// For automated checks; see `--tui-smoke`.
pub fn run_tui_smoke(target: Option<String>) -> Result<()> {
    let target = target.unwrap_or_else(|| "consent".to_string());
    tui::smoke(&target)
}

/// Copy the accumulated response table to `dest` (default: CWD) without
/// entering the wizard. An absent table is a notice, not a failure.
pub fn run_export(dest: Option<String>) -> Result<()> {
    let config = config::AppConfig::load()?;
    let table = storage::ResponseTable::new(config.table_path()?);
    let dest = match dest {
        Some(d) => std::path::PathBuf::from(d),
        None => std::env::current_dir()
            .context("Cannot resolve current directory")?
            .join(&config.table_file),
    };

    match api::export::write_bulk(&table, &dest)? {
        Some(path) => {
            info!("[PHASE: export] [STEP: cli] Exported responses to {:?}", path);
            println!("Exported all responses to {}", path.display());
        }
        None => {
            println!(
                "The responses file is not yet available. It will appear after the first submission."
            );
        }
    }
    Ok(())
}
