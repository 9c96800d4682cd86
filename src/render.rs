//! Section rendering plan: flattens one section subtree into the ordered
//! list of headings and input bindings a frontend walks top to bottom.
//!
//! The plan is pure; the frontend owns the widgets and writes every value
//! back into the response store as it changes (write-through binding), so no
//! answer is lost by navigating away without an explicit save.

use crate::error::SurveyError;
use crate::questionnaire::{
    is_consent_leaf, InputKind, QuestionNode, QuestionPath, Questionnaire,
};
use crate::session::store::AnswerValue;
use chrono::NaiveDate;
use log::warn;

/// One renderable item of a section form, in display order.
#[derive(Debug, Clone, PartialEq)]
pub enum FormItem {
    /// Group label; structural only, carries no value.
    Heading { depth: usize, label: String },
    /// An answerable question bound to the store under `path`.
    Question {
        path: QuestionPath,
        label: String,
        kind: InputKind,
        options: Vec<String>,
    },
    /// The free-text remarks paired with the preceding question.
    Remarks { path: QuestionPath, label: String },
}

/// Build the render plan for section `index` (1-based). Consent leaves are
/// skipped: the sign-off block belongs to the dedicated consent step.
pub fn section_plan(
    questionnaire: &Questionnaire,
    index: usize,
) -> Result<Vec<FormItem>, SurveyError> {
    let (label, node) = questionnaire.section(index).ok_or_else(|| {
        SurveyError::Configuration(format!("no section at index {}", index))
    })?;
    let mut items = Vec::new();
    let path = QuestionPath::root(label)?;
    let QuestionNode::Group { children } = node else {
        return Err(SurveyError::Configuration(format!(
            "section '{}' is not a group",
            label
        )));
    };
    for (child_label, child) in children {
        walk(child_label, child, &path, 1, &mut items)?;
    }
    Ok(items)
}

fn walk(
    label: &str,
    node: &QuestionNode,
    parent: &QuestionPath,
    depth: usize,
    items: &mut Vec<FormItem>,
) -> Result<(), SurveyError> {
    if matches!(node, QuestionNode::Leaf { .. }) && is_consent_leaf(label) {
        return Ok(());
    }
    let path = parent.child(label)?;
    match node {
        QuestionNode::Group { children } => {
            items.push(FormItem::Heading {
                depth,
                label: label.to_string(),
            });
            for (child_label, child) in children {
                walk(child_label, child, &path, depth + 1, items)?;
            }
        }
        QuestionNode::Leaf { kind, options } => {
            items.push(FormItem::Question {
                path: path.clone(),
                label: label.to_string(),
                kind: *kind,
                options: options.clone(),
            });
            items.push(FormItem::Remarks {
                path: path.remarks(),
                label: label.to_string(),
            });
        }
    }
    Ok(())
}

/// Widget default for a question: the stored value where it is still usable,
/// otherwise the kind's fallback. Stale stored values are coerced (and the
/// coercion logged) rather than surfaced as errors.
pub fn default_answer(
    path: &QuestionPath,
    kind: InputKind,
    options: &[String],
    stored: Option<&AnswerValue>,
    today: NaiveDate,
) -> AnswerValue {
    match kind {
        InputKind::FreeText => match stored {
            Some(AnswerValue::Text(s)) => AnswerValue::Text(s.clone()),
            Some(other) => {
                warn!(
                    "[PHASE: render] [STEP: defaults] Non-text value for '{}' reset to empty ({:?})",
                    path, other
                );
                AnswerValue::Text(String::new())
            }
            None => AnswerValue::Text(String::new()),
        },
        InputKind::Date => match stored {
            Some(AnswerValue::Date(d)) => AnswerValue::Date(*d),
            Some(other) => {
                warn!(
                    "[PHASE: render] [STEP: defaults] Invalid stored date for '{}' coerced to today ({:?})",
                    path, other
                );
                AnswerValue::Date(today)
            }
            None => AnswerValue::Date(today),
        },
        InputKind::SingleChoice => {
            let first = options.first().cloned().unwrap_or_default();
            match stored {
                Some(AnswerValue::One(v)) if options.contains(v) => AnswerValue::One(v.clone()),
                Some(other) => {
                    warn!(
                        "[PHASE: render] [STEP: defaults] Stored choice for '{}' not among options, using first ({:?})",
                        path, other
                    );
                    AnswerValue::One(first)
                }
                None => AnswerValue::One(first),
            }
        }
        InputKind::MultiChoice => match stored {
            Some(AnswerValue::Many(chosen)) => {
                let kept: Vec<String> = chosen
                    .iter()
                    .filter(|c| options.contains(c))
                    .cloned()
                    .collect();
                if kept.len() != chosen.len() {
                    warn!(
                        "[PHASE: render] [STEP: defaults] Dropped {} stale selections for '{}'",
                        chosen.len() - kept.len(),
                        path
                    );
                }
                AnswerValue::Many(kept)
            }
            Some(other) => {
                warn!(
                    "[PHASE: render] [STEP: defaults] Non-list value for '{}' reset to empty ({:?})",
                    path, other
                );
                AnswerValue::Many(Vec::new())
            }
            None => AnswerValue::Many(Vec::new()),
        },
    }
}

/// Default for a remarks field: the stored text or empty.
pub fn default_remarks(stored: Option<&AnswerValue>) -> AnswerValue {
    match stored {
        Some(AnswerValue::Text(s)) => AnswerValue::Text(s.clone()),
        _ => AnswerValue::Text(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Questionnaire {
        Questionnaire::from_json(
            r#"{
                "1. Animal Care": {
                    "1.1 Cattle Health": {
                        "1.1.1 Preventive Care": {
                            "Q-a": ["a", "b"],
                            "Q-b": null
                        }
                    }
                },
                "Respondent and Location Details": {
                    "Name of the respondent": null,
                    "Consent to fill the form": ["Yes", "No"],
                    "Signature of the respondent": null
                }
            }"#,
        )
        .unwrap()
    }

    fn q1_path() -> QuestionPath {
        QuestionPath::root("1. Animal Care")
            .unwrap()
            .child("1.1 Cattle Health")
            .unwrap()
            .child("1.1.1 Preventive Care")
            .unwrap()
            .child("Q-a")
            .unwrap()
    }

    #[test]
    fn plan_interleaves_headings_questions_and_remarks() {
        let plan = section_plan(&nested(), 1).unwrap();
        let kinds: Vec<&str> = plan
            .iter()
            .map(|i| match i {
                FormItem::Heading { .. } => "heading",
                FormItem::Question { .. } => "question",
                FormItem::Remarks { .. } => "remarks",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["heading", "heading", "question", "remarks", "question", "remarks"]
        );

        let FormItem::Question { path, .. } = &plan[2] else {
            panic!("third item should be Q-a")
        };
        assert_eq!(path, &q1_path());
        let FormItem::Remarks { path, .. } = &plan[3] else {
            panic!("fourth item should be Q-a remarks")
        };
        assert_eq!(path.as_str(), format!("{}|Remarks", q1_path()));
    }

    #[test]
    fn heading_depth_follows_nesting() {
        let plan = section_plan(&nested(), 1).unwrap();
        let depths: Vec<usize> = plan
            .iter()
            .filter_map(|i| match i {
                FormItem::Heading { depth, .. } => Some(*depth),
                _ => None,
            })
            .collect();
        assert_eq!(depths, vec![1, 2]);
    }

    #[test]
    fn consent_leaves_are_skipped() {
        let plan = section_plan(&nested(), 2).unwrap();
        assert!(plan.iter().all(|item| match item {
            FormItem::Question { label, .. } => !is_consent_leaf(label),
            _ => true,
        }));
        // Only the respondent-name question (plus remarks) remains.
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn defaults_keep_usable_stored_values() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let opts = vec!["x".to_string(), "y".to_string()];
        let p = q1_path();

        let kept = default_answer(
            &p,
            InputKind::SingleChoice,
            &opts,
            Some(&AnswerValue::One("y".into())),
            today,
        );
        assert_eq!(kept, AnswerValue::One("y".into()));

        let stored_date = AnswerValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let kept = default_answer(&p, InputKind::Date, &[], Some(&stored_date), today);
        assert_eq!(kept, stored_date);
    }

    #[test]
    fn defaults_coerce_stale_values() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let opts = vec!["x".to_string(), "y".to_string()];
        let p = q1_path();

        // Out-of-option choice falls back to the first option.
        let coerced = default_answer(
            &p,
            InputKind::SingleChoice,
            &opts,
            Some(&AnswerValue::One("gone".into())),
            today,
        );
        assert_eq!(coerced, AnswerValue::One("x".into()));

        // A non-date value under a date question becomes today.
        let coerced = default_answer(
            &p,
            InputKind::Date,
            &[],
            Some(&AnswerValue::Text("not a date".into())),
            today,
        );
        assert_eq!(coerced, AnswerValue::Date(today));

        // Stale multi-select entries are dropped, fresh ones kept.
        let coerced = default_answer(
            &p,
            InputKind::MultiChoice,
            &opts,
            Some(&AnswerValue::Many(vec!["y".into(), "gone".into()])),
            today,
        );
        assert_eq!(coerced, AnswerValue::Many(vec!["y".into()]));
    }

    #[test]
    fn missing_answers_get_kind_fallbacks() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let opts = vec!["x".to_string()];
        let p = q1_path();

        assert_eq!(
            default_answer(&p, InputKind::FreeText, &[], None, today),
            AnswerValue::Text(String::new())
        );
        assert_eq!(
            default_answer(&p, InputKind::Date, &[], None, today),
            AnswerValue::Date(today)
        );
        assert_eq!(
            default_answer(&p, InputKind::SingleChoice, &opts, None, today),
            AnswerValue::One("x".into())
        );
        assert_eq!(
            default_answer(&p, InputKind::MultiChoice, &opts, None, today),
            AnswerValue::Many(vec![])
        );
        assert_eq!(
            default_remarks(None),
            AnswerValue::Text(String::new())
        );
    }
}
