// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;

/// Mask personally identifying respondent data in logs.
///
/// Signatures, email addresses and contact numbers are survey answers; log
/// lines that mention them keep only a short prefix/suffix for correlation.
pub fn mask_sensitive(input: &str) -> String {
    if input.len() <= 8 {
        return "***".to_string();
    }

    let visible = 4;
    let start = &input[..visible.min(input.len())];
    let end = &input[input.len().saturating_sub(visible)..];

    format!("{}...{}", start, end)
}

/// Whether a question path points at an answer that must never be logged
/// verbatim (contact details and sign-off signatures).
pub fn is_sensitive_path(path: &str) -> bool {
    let leaf = path.rsplit('|').next().unwrap_or(path);
    let lowered = leaf.to_ascii_lowercase();
    lowered.contains("signature")
        || lowered.contains("email")
        || lowered.contains("contact number")
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let mut phase = None;
    let mut step = None;
    let mut cleaned_message = message.to_string();

    if let Some(start) = message.find("[PHASE:") {
        if let Some(end) = message[start..].find(']') {
            let phase_str = &message[start + 7..start + end].trim();
            phase = Some(phase_str.to_string());
            cleaned_message = format!("{} {}", &message[..start], &message[start + end + 1..])
                .trim()
                .to_string();
        }
    }

    if let Some(start) = cleaned_message.find("[STEP:") {
        if let Some(end) = cleaned_message[start..].find(']') {
            let step_str = &cleaned_message[start + 6..start + end].trim();
            step = Some(step_str.to_string());
            cleaned_message = format!(
                "{} {}",
                &cleaned_message[..start],
                &cleaned_message[start + end + 1..]
            )
            .trim()
            .to_string();
        }
    }

    (phase, step, cleaned_message)
}

/// One structured JSON log line (for the `.log` file).
pub fn format_json_log(
    timestamp_utc: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let entry = json!({
        "timestamp": timestamp_utc,
        "level": level.to_string(),
        "target": target,
        "phase": phase,
        "step": step,
        "message": message,
    });
    entry.to_string()
}

/// One human-readable log line (for the `.txt` file / stdout).
pub fn format_human_readable_log(
    timestamp_local: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut prefix = String::new();
    if let Some(p) = phase {
        prefix.push_str(&format!("[{}] ", p));
    }
    if let Some(s) = step {
        prefix.push_str(&format!("[{}] ", s));
    }
    format!(
        "{} {:5} {} {}{}",
        timestamp_local, level, target, prefix, message
    )
}
