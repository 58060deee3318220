use schemadiff_core::SchemaTree;
use schemadiff_json::{JsonSourceError, SampleOptions, json_samples_to_schema, read_records};
use serde_json::json;

fn canonical(text: &str, options: &SampleOptions) -> SchemaTree {
    json_samples_to_schema("sample", text, options)
        .unwrap()
        .canonicalize()
        .unwrap()
}

fn tree(wire: serde_json::Value) -> SchemaTree {
    SchemaTree::from_json(&wire).unwrap()
}

#[test]
fn reads_single_object_array_and_ndjson() {
    let options = SampleOptions::default();
    assert_eq!(read_records(r#"{"a": 1}"#, &options).unwrap().len(), 1);
    assert_eq!(read_records(r#"[{"a": 1}, {"a": 2}]"#, &options).unwrap().len(), 2);
    assert_eq!(
        read_records("{\"a\": 1}\n\n{\"a\": 2}\n{\"a\": 3}\n", &options)
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn max_records_bounds_sampling() {
    let options = SampleOptions {
        max_records: Some(2),
        ..SampleOptions::default()
    };
    assert_eq!(read_records("{}\n{}\n{}\n", &options).unwrap().len(), 2);
    assert_eq!(read_records("[{}, {}, {}]", &options).unwrap().len(), 2);
}

#[test]
fn field_missing_in_some_records_is_optional() {
    let out = canonical(
        "{\"id\": 1, \"name\": \"a\"}\n{\"id\": 2}\n",
        &SampleOptions::default(),
    );
    assert_eq!(out, tree(json!({"id": "int", "name": "union(missing|str)"})));
}

#[test]
fn null_values_make_a_field_nullable() {
    let out = canonical(
        r#"[{"score": 1.5}, {"score": null}, {"score": 2}]"#,
        &SampleOptions::default(),
    );
    assert_eq!(out, tree(json!({"score": "union(float|int|missing)"})));
}

#[test]
fn nested_objects_and_arrays_are_inferred() {
    let out = canonical(
        r#"[
            {"address": {"city": "Oslo"}, "items": [{"sku": "a", "qty": 1}, {"sku": "b"}]},
            {"address": {"city": "Rome", "zip": "00100"}, "items": []}
        ]"#,
        &SampleOptions::default(),
    );
    assert_eq!(
        out,
        tree(json!({
            "address": {"city": "str", "zip": "union(missing|str)"},
            "items": [{"sku": "str", "qty": "union(int|missing)"}]
        }))
    );
}

#[test]
fn empty_array_has_any_elements() {
    let out = canonical(r#"{"tags": []}"#, &SampleOptions::default());
    assert_eq!(out, tree(json!({"tags": ["any"]})));
}

#[test]
fn objects_keyed_list_are_plain_fields() {
    let options = SampleOptions::default();
    assert_eq!(
        canonical(r#"{"page": {"list": []}}"#, &options),
        tree(json!({"page": {"list": ["any"]}}))
    );
    assert_eq!(
        canonical(r#"{"page": {"list": {}}}"#, &options),
        tree(json!({"page": {"list": {}}}))
    );
    assert_eq!(
        canonical(r#"{"page": {"list": {"element": 1}}}"#, &options),
        tree(json!({"page": {"list": {"element": "int"}}}))
    );
}

#[test]
fn array_missing_from_a_record_is_optional() {
    let out = canonical(
        "{\"tags\": [\"x\"]}\n{}\n",
        &SampleOptions::default(),
    );
    assert_eq!(
        out.get("tags").map(|n| n.type_of().to_string()),
        Some("union(array|missing)".to_string())
    );
}

#[test]
fn timestamps_are_detected_only_when_enabled() {
    let text = r#"{"at": "2024-05-01T12:30:00Z", "day": "2024-05-01", "name": "x"}"#;

    let plain = canonical(text, &SampleOptions::default());
    assert_eq!(plain, tree(json!({"at": "str", "day": "str", "name": "str"})));

    let detecting = SampleOptions {
        detect_timestamps: true,
        ..SampleOptions::default()
    };
    assert_eq!(
        canonical(text, &detecting),
        tree(json!({"at": "timestamp", "day": "timestamp", "name": "str"}))
    );
}

#[test]
fn required_paths_follow_presence_in_every_record() {
    let raw = json_samples_to_schema(
        "sample",
        r#"[{"a": {"b": 1}, "c": [{"d": 1}]}, {"a": {"b": 2}, "c": [{"d": 2, "e": 1}]}]"#,
        &SampleOptions::default(),
    )
    .unwrap();

    let required: Vec<&str> = raw.required.iter().collect();
    assert_eq!(required, vec!["a", "a.b", "c", "c.d"]);
    assert_eq!(raw.label, "sample");
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(
        read_records("  \n", &SampleOptions::default()),
        Err(JsonSourceError::NoRecords)
    ));
    assert!(matches!(
        read_records("[]", &SampleOptions::default()),
        Err(JsonSourceError::NoRecords)
    ));
}

#[test]
fn non_object_record_is_rejected() {
    let err = read_records(r#"[{"a": 1}, 3]"#, &SampleOptions::default()).unwrap_err();
    assert!(matches!(err, JsonSourceError::NotAnObject { index: 1, .. }));
}

#[test]
fn malformed_line_is_reported_with_its_number() {
    let err = read_records("{\"a\": 1}\n{\"a\": }\n", &SampleOptions::default()).unwrap_err();
    match err {
        JsonSourceError::Parse { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}
