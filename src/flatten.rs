//! Flattening of the answers document into an identifier → value lookup.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::*;

/// How lookup keys are derived for extracted leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPolicy {
    /// Dot-joined path from the document root, e.g. `contact.email`. Distinct
    /// paths never collide.
    #[default]
    Path,
    /// Innermost property name only. Keys can collide across nesting paths;
    /// the last-visited leaf wins.
    Shallow,
}

/// How arrays in the answers document are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayPolicy {
    /// Record the whole array verbatim under its originating key.
    #[default]
    Whole,
    /// Descend into each element as if it were a direct child of the array's
    /// parent; the array itself contributes no path segment.
    Elementwise,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    pub key_policy: KeyPolicy,
    pub array_policy: ArrayPolicy,
}

/// Walk the answers value tree and collect every scalar leaf (and, under
/// [`ArrayPolicy::Whole`], every array) into a flat lookup map.
///
/// The caller is expected to have checked that `root` is an object; any other
/// root yields an empty map. A key recorded twice overwrites its earlier
/// entry.
pub fn flatten_answers(root: &Value, options: &FlattenOptions) -> IndexMap<String, Value> {
    let mut extracted = IndexMap::new();
    flatten_into(&mut extracted, root, "", options);
    extracted
}

fn flatten_into(
    out: &mut IndexMap<String, Value>,
    value: &Value,
    parent_key: &str,
    options: &FlattenOptions,
) {
    match value {
        Value::Object(members) => {
            for (name, child) in members {
                let key = derive_key(parent_key, name, options.key_policy);
                match child {
                    Value::Object(_) => flatten_into(out, child, &key, options),
                    Value::Array(_) => match options.array_policy {
                        ArrayPolicy::Whole => {
                            debug!("extracted array field: {key}");
                            out.insert(key, child.clone());
                        }
                        ArrayPolicy::Elementwise => flatten_into(out, child, &key, options),
                    },
                    leaf => {
                        debug!("extracted field: {key} = {leaf}");
                        out.insert(key, leaf.clone());
                    }
                }
            }
        }
        Value::Array(items) => {
            // Only reachable under the element-wise policy.
            for item in items {
                flatten_into(out, item, parent_key, options);
            }
        }
        leaf => {
            // A scalar array element; it is recorded under the array's key.
            debug!("extracted field: {parent_key} = {leaf}");
            out.insert(parent_key.to_owned(), leaf.clone());
        }
    }
}

fn derive_key(parent: &str, name: &str, policy: KeyPolicy) -> String {
    match policy {
        KeyPolicy::Shallow => name.to_owned(),
        KeyPolicy::Path if parent.is_empty() => name.to_owned(),
        KeyPolicy::Path => format!("{parent}.{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flatten(root: &Value, key_policy: KeyPolicy, array_policy: ArrayPolicy) -> IndexMap<String, Value> {
        flatten_answers(
            root,
            &FlattenOptions {
                key_policy,
                array_policy,
            },
        )
    }

    #[test]
    fn flat_object_is_extracted_verbatim() {
        let answers = json!({"name": "Ada", "age": 36});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        assert_eq!(map.len(), 2);
        assert_eq!(map["name"], json!("Ada"));
        assert_eq!(map["age"], json!(36));
    }

    #[test]
    fn path_policy_joins_with_dots() {
        let answers = json!({"contact": {"email": "a@b.com", "phone": {"home": "123"}}});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        assert_eq!(map["contact.email"], json!("a@b.com"));
        assert_eq!(map["contact.phone.home"], json!("123"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn shallow_policy_keeps_innermost_name() {
        let answers = json!({"contact": {"email": "a@b.com"}});
        let map = flatten(&answers, KeyPolicy::Shallow, ArrayPolicy::Whole);
        assert_eq!(map["email"], json!("a@b.com"));
        assert!(!map.contains_key("contact.email"));
    }

    #[test]
    fn shallow_collision_last_write_wins() {
        let answers = json!({"a": {"x": 1}, "b": {"x": 2}});
        let map = flatten(&answers, KeyPolicy::Shallow, ArrayPolicy::Whole);
        assert_eq!(map.len(), 1);
        assert_eq!(map["x"], json!(2));
    }

    #[test]
    fn whole_policy_records_array_verbatim() {
        let answers = json!({"tags": ["a", "b"], "nested": {"ids": [1, 2, 3]}});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        assert_eq!(map["tags"], json!(["a", "b"]));
        assert_eq!(map["nested.ids"], json!([1, 2, 3]));
    }

    #[test]
    fn elementwise_policy_descends_into_object_elements() {
        let answers = json!({"items": [{"x": 1}, {"y": 2}]});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Elementwise);
        assert_eq!(map["items.x"], json!(1));
        assert_eq!(map["items.y"], json!(2));
    }

    #[test]
    fn elementwise_policy_adds_no_segment_for_the_array() {
        let answers = json!({"rows": [{"cell": "a"}]});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Elementwise);
        // `rows.cell`, not `rows.0.cell`.
        assert_eq!(map["rows.cell"], json!("a"));
    }

    #[test]
    fn elementwise_scalar_elements_resolve_last_write_wins() {
        let answers = json!({"tags": ["a", "b"]});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Elementwise);
        assert_eq!(map.len(), 1);
        assert_eq!(map["tags"], json!("b"));
    }

    #[test]
    fn scalar_leaves_of_every_kind_are_kept() {
        let answers = json!({"s": "x", "n": 1.5, "b": true, "z": null});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        assert_eq!(map.len(), 4);
        assert_eq!(map["n"], json!(1.5));
        assert_eq!(map["b"], json!(true));
        assert_eq!(map["z"], json!(null));
    }

    #[test]
    fn no_leaf_is_dropped() {
        let answers = json!({
            "a": "1",
            "b": {"c": "2", "d": {"e": "3"}},
            "f": {"g": "4"}
        });
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn empty_object_yields_empty_map() {
        let map = flatten(&json!({}), KeyPolicy::Path, ArrayPolicy::Whole);
        assert!(map.is_empty());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let answers = json!({"first": "1", "second": "2", "third": "3"});
        let map = flatten(&answers, KeyPolicy::Path, ArrayPolicy::Whole);
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["first", "second", "third"]);
    }
}
