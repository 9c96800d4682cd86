//! The immutable question tree and its path keys.
//!
//! A questionnaire is an arbitrarily deep tree of labeled nodes: groups hold
//! further nodes in insertion order, leaves are answerable questions with a
//! closed input kind. The tree is built once at startup, validated fail-fast,
//! and passed by reference everywhere else; nothing mutates it afterwards.

pub mod catalog;
pub mod raw;

use crate::error::SurveyError;
use crate::utils::validation::validate_label;
use indexmap::IndexMap;
use raw::{RawCatalog, RawNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved path separator; labels are validated to never contain it.
pub const PATH_SEPARATOR: char = '|';

/// Suffix of the paired free-text remarks column of a question.
pub const REMARKS_SUFFIX: &str = "|Remarks";

/// The fixed sign-off block. These leaves stay in the catalog for structure
/// but are collected only in the dedicated consent step, are skipped by
/// generic section rendering, and contribute no remarks column.
pub const CONSENT_LEAVES: [&str; 6] = [
    "Consent to fill the form",
    "Signature of the respondent",
    "Reviewed and confirmed by Route Incharge",
    "Signature of Route In charge",
    "Reviewed and confirmed by Ksheersagar SPOC",
    "Signature of SPOC",
];

pub fn is_consent_leaf(label: &str) -> bool {
    CONSENT_LEAVES.contains(&label)
}

/// What a leaf collects and what value its widget returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// Free string.
    FreeText,
    /// Calendar date.
    Date,
    /// Exactly one of the declared options.
    SingleChoice,
    /// Any subset of the declared options, in selection order.
    MultiChoice,
}

/// Tagged question-tree node. Labels live in the parent's ordered map.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionNode {
    Group {
        children: IndexMap<String, QuestionNode>,
    },
    Leaf {
        kind: InputKind,
        /// Non-empty for choice kinds, empty otherwise.
        options: Vec<String>,
    },
}

impl QuestionNode {
    pub fn is_group(&self) -> bool {
        matches!(self, QuestionNode::Group { .. })
    }

    pub fn choice(kind: InputKind, options: Vec<String>) -> Self {
        QuestionNode::Leaf { kind, options }
    }
}

/// Fully-qualified question key: ancestor labels joined by `|`, root first.
///
/// Opaque value type; construction validates each label so the joined form is
/// unambiguous. Used as the join key across the response store, widget
/// identity and persisted column names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionPath(String);

impl QuestionPath {
    pub fn root(label: &str) -> Result<Self, SurveyError> {
        validate_label(label)?;
        Ok(QuestionPath(label.to_string()))
    }

    pub fn child(&self, label: &str) -> Result<Self, SurveyError> {
        validate_label(label)?;
        Ok(QuestionPath(format!("{}{}{}", self.0, PATH_SEPARATOR, label)))
    }

    /// The paired remarks key of this question.
    pub fn remarks(&self) -> Self {
        QuestionPath(format!("{}{}", self.0, REMARKS_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment; what the review screen shows as the question.
    pub fn leaf_label(&self) -> &str {
        self.0.rsplit(PATH_SEPARATOR).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for QuestionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The validated, immutable question tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Questionnaire {
    root: IndexMap<String, QuestionNode>,
}

impl Questionnaire {
    /// Build and validate a tree from already-tagged nodes.
    ///
    /// Fails fast on any invariant violation: bad labels, a non-group
    /// top-level child, or a choice leaf without options.
    pub fn new(root: IndexMap<String, QuestionNode>) -> Result<Self, SurveyError> {
        if root.is_empty() {
            return Err(SurveyError::Configuration(
                "questionnaire has no sections".to_string(),
            ));
        }
        for (label, node) in &root {
            validate_label(label)?;
            if !node.is_group() {
                return Err(SurveyError::Configuration(format!(
                    "top-level entry '{}' must be a section group, not a question",
                    label
                )));
            }
            validate_subtree(label, node)?;
        }
        Ok(Questionnaire { root })
    }

    /// Convert the raw catalog shapes into the tagged tree and validate.
    pub fn from_raw(raw: RawCatalog) -> Result<Self, SurveyError> {
        let mut root = IndexMap::new();
        for (label, node) in raw {
            let tagged = tag_node(&label, node)?;
            root.insert(label, tagged);
        }
        Questionnaire::new(root)
    }

    pub fn from_json(json: &str) -> Result<Self, SurveyError> {
        let parsed = raw::parse(json)
            .map_err(|e| SurveyError::Configuration(format!("catalog JSON: {}", e)))?;
        Questionnaire::from_raw(parsed)
    }

    pub fn root(&self) -> &IndexMap<String, QuestionNode> {
        &self.root
    }

    /// Number of top-level sections (N in the step machine).
    pub fn section_count(&self) -> usize {
        self.root.len()
    }

    /// 1-based section lookup, matching step numbering.
    pub fn section(&self, index: usize) -> Option<(&str, &QuestionNode)> {
        self.root
            .get_index(index.checked_sub(1)?)
            .map(|(label, node)| (label.as_str(), node))
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &QuestionNode)> {
        self.root.iter().map(|(l, n)| (l.as_str(), n))
    }
}

fn validate_subtree(label: &str, node: &QuestionNode) -> Result<(), SurveyError> {
    match node {
        QuestionNode::Group { children } => {
            if children.is_empty() {
                return Err(SurveyError::Configuration(format!(
                    "group '{}' has no children",
                    label
                )));
            }
            for (child_label, child) in children {
                validate_label(child_label)?;
                validate_subtree(child_label, child)?;
            }
            Ok(())
        }
        QuestionNode::Leaf { kind, options } => match kind {
            InputKind::SingleChoice | InputKind::MultiChoice => {
                if options.is_empty() {
                    Err(SurveyError::Configuration(format!(
                        "choice question '{}' has an empty option list",
                        label
                    )))
                } else {
                    Ok(())
                }
            }
            InputKind::FreeText | InputKind::Date => {
                if options.is_empty() {
                    Ok(())
                } else {
                    Err(SurveyError::Configuration(format!(
                        "text question '{}' carries an option list",
                        label
                    )))
                }
            }
        },
    }
}

/// Infer the closed input kind from the raw shape, per the catalog
/// conventions: no options means free text (a date when the label says so),
/// an option list means single choice unless the label asks for multiple.
fn tag_node(label: &str, raw: RawNode) -> Result<QuestionNode, SurveyError> {
    match raw {
        RawNode::Group(children) => {
            let mut tagged = IndexMap::new();
            for (child_label, child) in children {
                let node = tag_node(&child_label, child)?;
                tagged.insert(child_label, node);
            }
            Ok(QuestionNode::Group { children: tagged })
        }
        RawNode::Options(options) => {
            let kind = if label.contains("multiple options") {
                InputKind::MultiChoice
            } else {
                InputKind::SingleChoice
            };
            Ok(QuestionNode::Leaf { kind, options })
        }
        RawNode::FreeText => {
            let kind = if label.contains("Date") {
                InputKind::Date
            } else {
                InputKind::FreeText
            };
            Ok(QuestionNode::Leaf {
                kind,
                options: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn tiny() -> Questionnaire {
        Questionnaire::new(indexmap! {
            "A".to_string() => QuestionNode::Group { children: indexmap! {
                "Q1".to_string() => QuestionNode::choice(
                    InputKind::SingleChoice,
                    vec!["x".to_string(), "y".to_string()],
                ),
            }},
        })
        .expect("tiny tree is valid")
    }

    #[test]
    fn paths_join_with_the_separator() {
        let p = QuestionPath::root("A").unwrap().child("Q1").unwrap();
        assert_eq!(p.as_str(), "A|Q1");
        assert_eq!(p.leaf_label(), "Q1");
        assert_eq!(p.remarks().as_str(), "A|Q1|Remarks");
        assert_eq!(p.remarks().leaf_label(), "Remarks");
    }

    #[test]
    fn paths_are_ordered_values_not_strings() {
        let a = QuestionPath::root("A").unwrap().child("Q1").unwrap();
        let b = QuestionPath::root("A").unwrap().child("Q1").unwrap();
        assert_eq!(a, b);
        let c = QuestionPath::root("A").unwrap().child("Q2").unwrap();
        assert!(a < c);
    }

    #[test]
    fn kind_inference_from_raw_shapes() {
        let q = Questionnaire::from_json(
            r#"{
                "S": {
                    "Date of response": null,
                    "Name of the respondent": null,
                    "Grade (Pick multiple options)": ["a", "b"],
                    "Grade": ["a", "b"]
                }
            }"#,
        )
        .expect("tree parses");

        let (_, section) = q.section(1).unwrap();
        let QuestionNode::Group { children } = section else {
            panic!("section is a group")
        };
        let kind = |label: &str| match &children[label] {
            QuestionNode::Leaf { kind, .. } => *kind,
            _ => panic!("{} should be a leaf", label),
        };
        assert_eq!(kind("Date of response"), InputKind::Date);
        assert_eq!(kind("Name of the respondent"), InputKind::FreeText);
        assert_eq!(kind("Grade (Pick multiple options)"), InputKind::MultiChoice);
        assert_eq!(kind("Grade"), InputKind::SingleChoice);
    }

    #[test]
    fn top_level_leaf_is_rejected() {
        let err = Questionnaire::from_json(r#"{"Loose question": null}"#).unwrap_err();
        assert!(matches!(err, SurveyError::Configuration(_)));
    }

    #[test]
    fn separator_in_label_is_rejected() {
        let err = Questionnaire::from_json(r#"{"S": {"bad|label": null}}"#).unwrap_err();
        assert!(matches!(err, SurveyError::Configuration(_)));
    }

    #[test]
    fn empty_option_list_is_rejected() {
        let err = Questionnaire::from_json(r#"{"S": {"Pick": []}}"#).unwrap_err();
        assert!(matches!(err, SurveyError::Configuration(_)));
    }

    #[test]
    fn empty_group_is_rejected() {
        let err = Questionnaire::from_json(r#"{"S": {}}"#).unwrap_err();
        assert!(matches!(err, SurveyError::Configuration(_)));
    }

    #[test]
    fn section_lookup_is_one_based() {
        let q = tiny();
        assert_eq!(q.section_count(), 1);
        assert!(q.section(0).is_none());
        assert_eq!(q.section(1).unwrap().0, "A");
        assert!(q.section(2).is_none());
    }

    #[test]
    fn consent_set_matches_the_sign_off_block() {
        assert!(is_consent_leaf("Consent to fill the form"));
        assert!(is_consent_leaf("Signature of SPOC"));
        assert!(!is_consent_leaf("Designation"));
    }
}
