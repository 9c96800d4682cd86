//! Raw questionnaire shapes as they appear in the JSON catalog.
//!
//! The catalog mirrors the survey author's nested form: an object is a group
//! of sub-topics, an array is the ordered option list of a graded question,
//! and `null` marks a free-text (or date) field. This module is the only
//! place that inspects those runtime shapes; everything downstream works on
//! the tagged [`QuestionNode`](super::QuestionNode) tree.

use indexmap::IndexMap;
use serde::Deserialize;

/// One node of the raw catalog. Variant order matters for untagged
/// deserialization: objects, then arrays, then null.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
    Group(IndexMap<String, RawNode>),
    Options(Vec<String>),
    FreeText,
}

/// Top level of the catalog: section label -> section subtree.
pub type RawCatalog = IndexMap<String, RawNode>;

pub fn parse(json: &str) -> Result<RawCatalog, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_map_to_variants() {
        let raw = parse(
            r#"{
                "Section": {
                    "Pick one": ["a", "b"],
                    "Say something": null,
                    "Nested": { "Deeper": null }
                }
            }"#,
        )
        .expect("catalog snippet parses");

        let RawNode::Group(section) = &raw["Section"] else {
            panic!("section should be a group");
        };
        assert!(matches!(section["Pick one"], RawNode::Options(_)));
        assert!(matches!(section["Say something"], RawNode::FreeText));
        assert!(matches!(section["Nested"], RawNode::Group(_)));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let raw = parse(r#"{"b": null, "a": null, "c": null}"#).unwrap();
        let keys: Vec<&str> = raw.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
