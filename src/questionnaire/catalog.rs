//! The built-in survey content.
//!
//! The full Ksheersagar dairy self-assessment: respondent details plus five
//! graded assessment areas, 120 questions in all. The content is opaque
//! configuration data; it ships as an embedded JSON asset in the exact nested
//! shape the survey authors maintain it in.

use super::Questionnaire;
use crate::error::SurveyError;

pub const CATALOG_JSON: &str = include_str!("../../assets/questionnaire.json");

/// Parse and validate the embedded catalog. Called once at startup; a failure
/// here is a packaging defect and aborts initialization.
pub fn builtin() -> Result<Questionnaire, SurveyError> {
    Questionnaire::from_json(CATALOG_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{is_consent_leaf, InputKind, QuestionNode};

    #[test]
    fn builtin_catalog_parses_and_validates() {
        let q = builtin().expect("embedded catalog is valid");
        assert_eq!(q.section_count(), 6);
        assert_eq!(q.section(1).unwrap().0, "Respondent and Location Details");
        assert_eq!(
            q.section(6).unwrap().0,
            "5. Strengthening Traceability – Across all Levels"
        );
    }

    #[test]
    fn respondent_section_contains_the_sign_off_block() {
        let q = builtin().unwrap();
        let (_, section) = q.section(1).unwrap();
        let QuestionNode::Group { children } = section else {
            panic!("section is a group")
        };
        let consent_present = children
            .keys()
            .filter(|label| is_consent_leaf(label))
            .count();
        assert_eq!(consent_present, 6);
    }

    #[test]
    fn known_leaves_have_the_expected_kinds() {
        let q = builtin().unwrap();
        let (_, section) = q.section(1).unwrap();
        let QuestionNode::Group { children } = section else {
            panic!("section is a group")
        };

        match &children["Name of the Dairy Partner"] {
            QuestionNode::Leaf { kind, options } => {
                assert_eq!(*kind, InputKind::SingleChoice);
                assert_eq!(options.len(), 4);
            }
            _ => panic!("dairy partner should be a choice leaf"),
        }
        assert!(matches!(
            &children["Date of response"],
            QuestionNode::Leaf { kind: InputKind::Date, .. }
        ));
        assert!(matches!(
            &children["Name of the respondent"],
            QuestionNode::Leaf { kind: InputKind::FreeText, .. }
        ));
    }

    #[test]
    fn sop_question_is_a_multi_select() {
        let q = builtin().unwrap();
        let (_, procurement) = q.section(4).unwrap();
        let QuestionNode::Group { children } = procurement else {
            panic!("section is a group")
        };
        let QuestionNode::Group { children: quality } = &children["3.2 Milk Quality"] else {
            panic!("milk quality is a group")
        };
        match &quality["3.2.1 Adherence to standard operating procedures (Pick multiple options)"] {
            QuestionNode::Leaf { kind, options } => {
                assert_eq!(*kind, InputKind::MultiChoice);
                assert!(options.len() >= 10);
            }
            _ => panic!("SOP adherence should be a multi-select leaf"),
        }
    }
}
