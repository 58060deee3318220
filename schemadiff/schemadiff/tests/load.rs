use std::{fs, path::PathBuf};

use schemadiff::{
    AdapterError, LoadOptions, SourceError, SourceFormat, SourceSpec,
    core::{CompareOptions, SchemaTree},
    json::SampleOptions,
    load_source,
};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn json_samples_are_canonicalized() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "orders.ndjson",
        r#"{"id": 1, "note": "a", "placed_at": "2024-05-01T10:00:00Z"}
{"id": 2, "note": null, "placed_at": "2024-05-02T10:00:00Z"}
"#,
    );

    let loaded = load_source(&SourceSpec::new(&path), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label, "orders");
    assert_eq!(
        loaded.tree,
        SchemaTree::from_json(&json!({
            "id": "int",
            "note": "union(missing|str)",
            "placed_at": "str"
        }))
        .unwrap()
    );

    let options = LoadOptions {
        json: SampleOptions {
            max_records: Some(1),
            detect_timestamps: true,
        },
        ..LoadOptions::default()
    };
    let loaded = load_source(&SourceSpec::new(&path), &options).unwrap();
    assert_eq!(
        loaded.tree.to_json(),
        json!({"id": "int", "note": "str", "placed_at": "timestamp"})
    );
}

#[test]
fn sql_target_and_label_override() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "warehouse.sql",
        "CREATE TABLE shop.orders (id BIGINT NOT NULL, total DECIMAL(10, 2));\n\
         CREATE TABLE shop.customers (id BIGINT PRIMARY KEY, email TEXT);\n",
    );

    let ambiguous = load_source(&SourceSpec::new(&path), &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        ambiguous,
        SourceError::Adapter {
            format: SourceFormat::Sql,
            source: AdapterError::Sql(_),
            ..
        }
    ));
    assert!(ambiguous.to_string().contains("warehouse.sql"));

    let spec = SourceSpec::new(&path).with_target("orders");
    let loaded = load_source(&spec, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label, "shop.orders");
    assert_eq!(
        loaded.tree.to_json(),
        json!({"id": "int", "total": "union(float|missing)"})
    );

    let loaded = load_source(&spec.with_label("prod"), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label, "prod");
}

#[test]
fn explicit_format_overrides_inference() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "orders.out",
        "root\n |-- id: long (nullable = false)\n |-- note: string (nullable = true)\n",
    );

    let spec = SourceSpec::new(&path);
    assert!(matches!(
        load_source(&spec, &LoadOptions::default()),
        Err(SourceError::UnknownFormat { .. })
    ));

    let loaded = load_source(
        &spec.with_format(SourceFormat::Spark),
        &LoadOptions::default(),
    )
    .unwrap();
    assert_eq!(loaded.label, "orders");
    assert_eq!(
        loaded.tree.to_json(),
        json!({"id": "int", "note": "union(missing|str)"})
    );
}

#[test]
fn dbt_and_json_schema_sources() {
    let dir = TempDir::new().unwrap();
    let yaml = write(
        &dir,
        "schema.yml",
        r#"
version: 2
models:
  - name: orders
    columns:
      - name: id
        data_type: bigint
        data_tests: [not_null, unique]
      - name: status
        data_type: varchar
"#,
    );
    let loaded = load_source(&SourceSpec::new(&yaml), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label, "orders");
    assert_eq!(
        loaded.tree.to_json(),
        json!({"id": "int", "status": "union(missing|str)"})
    );

    let schema = write(
        &dir,
        "orders.schema.json",
        r#"{
  "type": "object",
  "required": ["id"],
  "properties": {
    "id": {"type": "integer"},
    "status": {"type": "string"}
  }
}"#,
    );
    let loaded = load_source(&SourceSpec::new(&schema), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label, "orders");
    assert_eq!(
        loaded.tree.to_json(),
        json!({"id": "int", "status": "union(missing|str)"})
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_source(&SourceSpec::new(&path), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn malformed_json_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{\"id\": 1,\n\"name\": }\n");
    let err = load_source(&SourceSpec::new(&path), &LoadOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SourceError::Adapter {
            format: SourceFormat::Json,
            ..
        }
    ));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn compare_sources_labels_the_report() {
    let dir = TempDir::new().unwrap();
    let left = write(&dir, "events.json", r#"[{"id": 1, "user": {"email": "a@b.c"}}]"#);
    let right = write(
        &dir,
        "events.sql",
        "CREATE TABLE events (id BIGINT NOT NULL, email TEXT NOT NULL);",
    );

    let report = schemadiff::compare_sources(
        &SourceSpec::new(&left),
        &SourceSpec::new(&right),
        &LoadOptions::default(),
        &CompareOptions::default(),
    )
    .unwrap();

    assert_eq!(report.left_label(), "events");
    assert_eq!(report.right_label(), "events");
    assert_eq!(report.common_fields(), ["id"]);
    assert_eq!(report.path_changes().len(), 1);
    assert_eq!(report.path_changes()[0].old_paths, ["user.email"]);
    assert_eq!(report.path_changes()[0].new_paths, ["email"]);
}
