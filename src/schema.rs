//! Schema derivation: one depth-first walk of the question tree fixes the
//! flat column list of the persisted table, so render order and storage
//! order can never drift apart.

use crate::error::SurveyError;
use crate::questionnaire::{is_consent_leaf, QuestionNode, QuestionPath, Questionnaire, CONSENT_LEAVES};
use std::collections::HashSet;

pub const SUBMISSION_ID: &str = "submission_id";
pub const SUBMISSION_TIMESTAMP: &str = "submission_timestamp";

/// Flat column list derived from the tree: every non-consent leaf's full
/// path, each immediately followed by its remarks column, then the two
/// generated metadata fields. Pure and deterministic; consent leaves are
/// handled by the fixed sign-off block, not the tree walk.
///
/// Sibling-label uniqueness already guarantees unique paths; a duplicate is
/// still treated as a fatal configuration error rather than silently merged.
pub fn derive_columns(questionnaire: &Questionnaire) -> Result<Vec<String>, SurveyError> {
    let mut columns = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (label, node) in questionnaire.sections() {
        let path = QuestionPath::root(label)?;
        walk(&path, node, &mut columns, &mut seen)?;
    }

    columns.push(SUBMISSION_ID.to_string());
    columns.push(SUBMISSION_TIMESTAMP.to_string());
    Ok(columns)
}

fn walk(
    path: &QuestionPath,
    node: &QuestionNode,
    columns: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> Result<(), SurveyError> {
    match node {
        QuestionNode::Group { children } => {
            for (label, child) in children {
                let child_path = path.child(label)?;
                walk(&child_path, child, columns, seen)?;
            }
            Ok(())
        }
        QuestionNode::Leaf { .. } => {
            if is_consent_leaf(path.leaf_label()) {
                return Ok(());
            }
            push_column(path.as_str().to_string(), columns, seen)?;
            push_column(path.remarks().as_str().to_string(), columns, seen)
        }
    }
}

fn push_column(
    column: String,
    columns: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> Result<(), SurveyError> {
    if !seen.insert(column.clone()) {
        return Err(SurveyError::Configuration(format!(
            "duplicate column '{}' derived from the question tree",
            column
        )));
    }
    columns.push(column);
    Ok(())
}

/// The persisted table header: the fixed consent/sign-off columns followed by
/// everything the tree walk derives. Computed once per tree and stable for
/// its lifetime; every appended row is reindexed against exactly this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn derive(questionnaire: &Questionnaire) -> Result<Self, SurveyError> {
        let mut columns: Vec<String> = CONSENT_LEAVES.iter().map(|s| s.to_string()).collect();
        columns.extend(derive_columns(questionnaire)?);
        Ok(Schema { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
