use schemadiff_core::{CanonicalType, FieldPath, SchemaTree, Tag, diff_trees};
use serde_json::json;

fn tree(wire: serde_json::Value) -> SchemaTree {
    SchemaTree::from_json(&wire).unwrap()
}

fn rendered<'a, V: 'a>(paths: impl Iterator<Item = (&'a FieldPath, V)>) -> Vec<String> {
    paths.map(|(p, _)| p.to_string()).collect()
}

#[test]
fn identical_trees_have_only_common_paths() {
    let t = tree(json!({"id": "int", "name": "str"}));
    let delta = diff_trees(&t, &t);

    assert!(delta.is_empty());
    assert_eq!(rendered(delta.common().iter()), vec!["id", "name"]);
}

#[test]
fn one_sided_fields_are_reported_per_leaf() {
    let left = tree(json!({"id": "int", "address": {"city": "str", "zip": "str"}}));
    let right = tree(json!({"id": "int", "email": "str"}));
    let delta = diff_trees(&left, &right);

    assert_eq!(
        rendered(delta.only_left().iter()),
        vec!["address.city", "address.zip"]
    );
    assert_eq!(rendered(delta.only_right().iter()), vec!["email"]);
}

#[test]
fn scalar_vs_object_is_one_atomic_mismatch() {
    let left = tree(json!({"a": {"x": "int", "y": "str"}}));
    let right = tree(json!({"a": "str"}));
    let delta = diff_trees(&left, &right);

    assert!(delta.only_left().is_empty());
    assert!(delta.only_right().is_empty());
    let changed: Vec<_> = delta.changed().collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].0.to_string(), "a");
    assert_eq!(changed[0].1.old, CanonicalType::scalar(Tag::Object));
    assert_eq!(changed[0].1.new, CanonicalType::scalar(Tag::Str));
}

#[test]
fn array_vs_scalar_is_one_atomic_mismatch() {
    let left = tree(json!({"tags": ["str"]}));
    let right = tree(json!({"tags": "str"}));
    let delta = diff_trees(&left, &right);

    let changed: Vec<_> = delta.changed().collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].0.to_string(), "tags");
    assert_eq!(changed[0].1.old.to_string(), "array");
    assert_eq!(changed[0].1.new.to_string(), "str");
    assert_eq!(delta.common().len(), 1);
}

#[test]
fn arrays_compare_element_shapes() {
    let left = tree(json!({"items": [{"sku": "str", "qty": "int"}], "tags": ["int"]}));
    let right = tree(json!({"items": [{"sku": "str", "price": "float"}], "tags": ["str"]}));
    let delta = diff_trees(&left, &right);

    assert_eq!(rendered(delta.only_left().iter()), vec!["items[].qty"]);
    assert_eq!(rendered(delta.only_right().iter()), vec!["items[].price"]);
    assert_eq!(rendered(delta.changed()), vec!["tags[]"]);
    assert_eq!(
        rendered(delta.common().iter()),
        vec!["items", "items[].sku", "tags", "tags[]"]
    );
}

#[test]
fn one_sided_array_lists_array_and_element_fields() {
    let left = tree(json!({"items": [{"sku": "str"}], "tags": ["str"]}));
    let right = tree(json!({}));
    let delta = diff_trees(&left, &right);

    assert_eq!(
        rendered(delta.only_left().iter()),
        vec!["items", "items[].sku", "tags"]
    );
}

#[test]
fn int_and_float_differ() {
    let delta = diff_trees(&tree(json!({"n": "int"})), &tree(json!({"n": "float"})));
    assert_eq!(rendered(delta.changed()), vec!["n"]);
}

#[test]
fn diff_is_symmetric() {
    let left = tree(json!({"a": "int", "b": {"c": "str"}, "d": ["int"]}));
    let right = tree(json!({"a": "float", "e": "bool", "d": ["union(int|missing)"]}));

    let forward = diff_trees(&left, &right);
    let backward = diff_trees(&right, &left);

    assert_eq!(forward.only_left(), backward.only_right());
    assert_eq!(forward.only_right(), backward.only_left());
    for (path, change) in forward.common() {
        let other = &backward.common()[path];
        assert_eq!(change.old, other.new);
        assert_eq!(change.new, other.old);
    }
}
