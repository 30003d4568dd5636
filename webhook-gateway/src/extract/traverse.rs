//! Traversal semantics for the path extractor (spec §4.1).

use std::collections::BTreeMap;

use serde_json::Value;

use super::pattern::PatternNode;
use crate::models::{ExtractedMap, ExtractedValue};

/// Extract every value matched by `patterns` out of `payload`.
pub fn extract(payload: &Value, patterns: &[PatternNode]) -> ExtractedMap {
    let mut acc: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    collect_roots(payload, patterns, &mut acc);
    shape(acc)
}

/// Top-level roots are looked up the same way as any other object
/// descent; a top-level array fans out exactly like a nested one.
fn collect_roots(container: &Value, patterns: &[PatternNode], acc: &mut BTreeMap<String, Vec<Value>>) {
    match container {
        Value::Object(obj) => {
            for node in patterns {
                if let Some(child) = obj.get(&node.name) {
                    descend(child, node, node.name.clone(), acc);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_roots(item, patterns, acc);
            }
        }
        _ => {}
    }
}

/// `value` is the JSON value found under `node.name`'s key; `path` is the
/// dotted path accumulated so far (including `node.name`).
fn descend(value: &Value, node: &PatternNode, path: String, acc: &mut BTreeMap<String, Vec<Value>>) {
    match value {
        Value::Array(items) => {
            // Arrays fan out transitively, including arrays of arrays.
            for item in items {
                descend(item, node, path.clone(), acc);
            }
        }
        Value::Object(obj) => {
            if node.children.is_empty() {
                // Leaf expected a scalar, found an object: silent type mismatch.
                return;
            }
            for child in &node.children {
                if let Some(next) = obj.get(&child.name) {
                    let next_path = format!("{path}.{}", child.name);
                    descend(next, child, next_path, acc);
                }
            }
        }
        scalar => {
            if node.children.is_empty() {
                acc.entry(path).or_default().push(scalar.clone());
            }
            // A leaf pattern descending into a scalar while expecting
            // children is the mirror silent mismatch.
        }
    }
}

/// Collapse single-value accumulations to scalars; drop empty ones.
fn shape(acc: BTreeMap<String, Vec<Value>>) -> ExtractedMap {
    acc.into_iter()
        .filter_map(|(path, mut values)| match values.len() {
            0 => None,
            1 => Some((path, ExtractedValue::Scalar(values.pop().unwrap()))),
            _ => Some((path, ExtractedValue::List(values))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_fields;
    use serde_json::json;

    fn extract_with(expr: &str, payload: Value) -> ExtractedMap {
        let patterns = parse_fields(expr).unwrap();
        extract(&payload, &patterns)
    }

    #[test]
    fn flat_field_extraction() {
        let map = extract_with("action", json!({"action": "opened"}));
        assert_eq!(map.get("action").unwrap().render(), "opened");
    }

    #[test]
    fn missing_root_contributes_nothing() {
        let map = extract_with("action", json!({"other": 1}));
        assert!(map.is_empty());
    }

    #[test]
    fn nested_descent() {
        let map = extract_with(
            "pull_request{title,user{login}}",
            json!({"pull_request": {"title": "T", "user": {"login": "u"}}}),
        );
        assert_eq!(map.get("pull_request.title").unwrap().render(), "T");
        assert_eq!(map.get("pull_request.user.login").unwrap().render(), "u");
    }

    #[test]
    fn array_fan_out_preserves_order() {
        let map = extract_with(
            "locations{search_id,asset_type}",
            json!({"locations": [
                {"search_id": "a", "asset_type": "cpe"},
                {"search_id": "b", "asset_type": "node"},
            ]}),
        );
        assert_eq!(map.get("locations.search_id").unwrap().render(), "a, b");
        assert_eq!(map.get("locations.asset_type").unwrap().render(), "cpe, node");
    }

    #[test]
    fn partial_array_elements_contribute_only_present_subkeys() {
        let map = extract_with(
            "locations{search_id,asset_type}",
            json!({"locations": [{"search_id": "a"}, {"asset_type": "node"}]}),
        );
        assert_eq!(map.get("locations.search_id").unwrap().render(), "a");
        assert_eq!(map.get("locations.asset_type").unwrap().render(), "node");
    }

    #[test]
    fn null_scalar_recorded_but_renders_empty() {
        let map = extract_with("x", json!({"x": null}));
        let value = map.get("x").unwrap();
        assert_eq!(value.render(), "");
        assert_eq!(*value, ExtractedValue::Scalar(Value::Null));
    }

    #[test]
    fn deeply_nested_arrays_flatten_transitively() {
        let map = extract_with("x", json!({"x": [[1, 2], [3]]}));
        assert_eq!(map.get("x").unwrap().render(), "1, 2, 3");
    }

    #[test]
    fn identical_paths_from_distinct_patterns_merge() {
        let patterns = parse_fields("a{b},a{b}").unwrap();
        let map = extract(&json!({"a": {"b": "v"}}), &patterns);
        // Two conjunctive descents to the same path merge into one
        // accumulation, which here means two collected values.
        assert_eq!(map.get("a.b").unwrap().render(), "v, v");
    }

    #[test]
    fn scalar_with_children_expected_is_silent_mismatch() {
        let map = extract_with("a{b}", json!({"a": "not-an-object"}));
        assert!(map.is_empty());
    }
}
