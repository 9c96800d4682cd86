// Input validation utilities

use crate::error::SurveyError;
use crate::questionnaire::PATH_SEPARATOR;
use regex::Regex;

/// Validate a question label before it becomes part of a path.
///
/// The path separator is reserved: a label containing it would make the
/// joined path ambiguous, so this is rejected at tree-construction time
/// rather than detected as a collision later.
pub fn validate_label(label: &str) -> Result<(), SurveyError> {
    let s = label.trim();
    if s.is_empty() {
        return Err(SurveyError::Configuration(
            "question label is empty".to_string(),
        ));
    }
    if s != label {
        return Err(SurveyError::Configuration(format!(
            "question label '{}' has leading or trailing whitespace",
            label
        )));
    }
    if label.contains(PATH_SEPARATOR) {
        return Err(SurveyError::Configuration(format!(
            "question label '{}' contains the reserved separator '{}'",
            label, PATH_SEPARATOR
        )));
    }
    if label.chars().any(|c| c.is_control()) {
        return Err(SurveyError::Configuration(format!(
            "question label '{}' contains control characters",
            label.escape_debug()
        )));
    }
    Ok(())
}

/// Sanitize a respondent display name for use in an export file name.
///
/// Spaces collapse to underscores; path separators and other characters that
/// are unsafe in file names are stripped entirely.
pub fn sanitize_export_name(name: &str) -> String {
    let spaces = Regex::new(r"\s+").expect("whitespace regex is valid");
    let collapsed = spaces.replace_all(name.trim(), "_");
    collapsed
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect()
}

/// Parse a `YYYY-MM-DD` date string as entered in the date widget.
pub fn parse_iso_date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rejects_separator() {
        assert!(validate_label("Name of the respondent").is_ok());
        assert!(validate_label("bad|label").is_err());
        assert!(validate_label("").is_err());
        assert!(validate_label("  padded  ").is_err());
        assert!(validate_label("tab\tlabel").is_err());
    }

    #[test]
    fn label_allows_punctuation_used_by_the_catalog() {
        assert!(validate_label("BMC/ MCC code").is_ok());
        assert!(validate_label("Location (Village, Taluka, District)").is_ok());
        assert!(validate_label("4. Women Empowerment -Participation and Entrepreneurship").is_ok());
    }

    #[test]
    fn export_name_sanitization() {
        assert_eq!(sanitize_export_name("Asha Patil"), "Asha_Patil");
        assert_eq!(sanitize_export_name("  a   b  "), "a_b");
        assert_eq!(sanitize_export_name("a/b\\c:d"), "abcd");
        assert_eq!(sanitize_export_name("route<1>?"), "route1");
    }

    #[test]
    fn iso_date_parsing() {
        assert_eq!(
            parse_iso_date("2025-03-09"),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 9)
        );
        assert_eq!(parse_iso_date(" 2025-03-09 "), parse_iso_date("2025-03-09"));
        assert!(parse_iso_date("2025-13-01").is_none());
        assert!(parse_iso_date("yesterday").is_none());
    }
}
