//! Structural diffing between a document and its snapshot
//!
//! Documents are schema-less, so the diff operates over the generic
//! `serde_json::Value` tree rather than static struct fields.
//!
//! Diff rules:
//! - a field is included iff its value differs from the snapshot,
//!   including addition and removal;
//! - nested objects are compared recursively field-by-field, so only
//!   leaf-level changes ship;
//! - array-valued fields are compared as whole values;
//! - a removed field is encoded as JSON `null` in the patch (the update
//!   request pairs this with `keepNull=false` so the server drops the
//!   attribute).
//!
//! An empty patch means the document is clean: callers must treat it as a
//! no-op success and skip the network round trip.

use serde_json::{Map, Value};

/// Compute the minimal patch that turns `snapshot` into `current`.
///
/// Both values are expected to be JSON objects; non-object inputs yield an
/// empty patch (there is no field level to diff at).
pub fn diff_documents(snapshot: &Value, current: &Value) -> Map<String, Value> {
    match (snapshot.as_object(), current.as_object()) {
        (Some(before), Some(after)) => diff_objects(before, after),
        _ => Map::new(),
    }
}

fn diff_objects(before: &Map<String, Value>, after: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for (field, value) in after {
        match before.get(field) {
            None => {
                patch.insert(field.clone(), value.clone());
            }
            Some(prior) if prior == value => {}
            Some(prior) => match (prior.as_object(), value.as_object()) {
                // Objects recurse; only changed leaves are kept.
                (Some(prior_obj), Some(value_obj)) => {
                    let nested = diff_objects(prior_obj, value_obj);
                    if !nested.is_empty() {
                        patch.insert(field.clone(), Value::Object(nested));
                    }
                }
                // Arrays and scalars replace as whole values.
                _ => {
                    patch.insert(field.clone(), value.clone());
                }
            },
        }
    }

    // Fields present in the snapshot but gone from the document.
    for field in before.keys() {
        if !after.contains_key(field) {
            patch.insert(field.clone(), Value::Null);
        }
    }

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diff(before: Value, after: Value) -> Map<String, Value> {
        diff_documents(&before, &after)
    }

    #[test]
    fn test_identical_documents_yield_empty_patch() {
        let doc = json!({"a": 1, "b": "x", "c": [1, 2]});
        assert!(diff(doc.clone(), doc).is_empty());
    }

    #[test]
    fn test_minimality_single_field_change() {
        let patch = diff(json!({"a": 1, "b": 2}), json!({"a": 1, "b": 3}));
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["b"], json!(3));
    }

    #[test]
    fn test_added_field_is_included() {
        let patch = diff(json!({"a": 1}), json!({"a": 1, "b": 2}));
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["b"], json!(2));
    }

    #[test]
    fn test_removed_field_becomes_null() {
        let patch = diff(json!({"a": 1, "b": 2}), json!({"a": 1}));
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["b"], Value::Null);
    }

    #[test]
    fn test_nested_objects_diff_recursively() {
        let before = json!({"addr": {"city": "Oslo", "zip": "0150"}, "name": "a"});
        let after = json!({"addr": {"city": "Bergen", "zip": "0150"}, "name": "a"});
        let patch = diff(before, after);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["addr"], json!({"city": "Bergen"}));
    }

    #[test]
    fn test_unchanged_nested_object_is_omitted() {
        let before = json!({"addr": {"city": "Oslo"}, "n": 1});
        let after = json!({"addr": {"city": "Oslo"}, "n": 2});
        let patch = diff(before, after);
        assert_eq!(patch.len(), 1);
        assert!(patch.contains_key("n"));
    }

    #[test]
    fn test_arrays_compare_as_whole_values() {
        let before = json!({"tags": [1, 2, 3]});
        let after = json!({"tags": [1, 2, 4]});
        let patch = diff(before, after);
        assert_eq!(patch["tags"], json!([1, 2, 4]));
    }

    #[test]
    fn test_type_change_replaces_value() {
        let patch = diff(json!({"v": {"a": 1}}), json!({"v": 7}));
        assert_eq!(patch["v"], json!(7));
    }

    #[test]
    fn test_null_to_value_is_a_change() {
        let patch = diff(json!({"v": null}), json!({"v": 1}));
        assert_eq!(patch["v"], json!(1));
    }

    #[test]
    fn test_deeply_nested_leaf_change() {
        let before = json!({"a": {"b": {"c": 1, "d": 2}}});
        let after = json!({"a": {"b": {"c": 1, "d": 3}}});
        let patch = diff(before, after);
        assert_eq!(patch["a"], json!({"b": {"d": 3}}));
    }

    #[test]
    fn test_nested_removal_becomes_null() {
        let before = json!({"a": {"b": 1, "c": 2}});
        let after = json!({"a": {"b": 1}});
        let patch = diff(before, after);
        assert_eq!(patch["a"], json!({"c": null}));
    }

    #[test]
    fn test_non_object_inputs_yield_empty_patch() {
        assert!(diff(json!([1, 2]), json!([3])).is_empty());
        assert!(diff(json!(1), json!(2)).is_empty());
    }

    // Diff idempotence: applying a diff result as the new snapshot leaves
    // nothing further to report.
    #[test]
    fn test_diff_against_current_state_is_empty() {
        let after = json!({"a": 1, "b": {"c": 2}});
        assert!(diff(after.clone(), after).is_empty());
    }
}
