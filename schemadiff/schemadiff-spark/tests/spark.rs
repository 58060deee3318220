use schemadiff_core::Tag;
use schemadiff_spark::{SparkSchemaError, map_spark_type, spark_schema_to_schema};
use serde_json::json;

const ORDERS: &str = "\
root
 |-- id: long (nullable = false)
 |-- customer: string (nullable = true)
 |-- amount: decimal(10,2) (nullable = true)
 |-- placed_at: timestamp (nullable = false)
 |-- shipping: struct (nullable = true)
 |    |-- city: string (nullable = false)
 |    |-- zip: string (nullable = true)
 |-- tags: array (nullable = true)
 |    |-- element: string (containsNull = true)
 |-- items: array (nullable = false)
 |    |-- element: struct (containsNull = true)
 |    |    |-- sku: string (nullable = false)
 |    |    |-- qty: integer (nullable = true)
 |-- attributes: map (nullable = true)
 |    |-- key: string
 |    |-- value: string (valueContainsNull = true)
";

#[test]
fn parses_print_schema_tree() {
    let raw = spark_schema_to_schema("orders_df", ORDERS).unwrap();
    assert_eq!(raw.label, "orders_df");

    let tree = raw.canonicalize().unwrap();
    assert_eq!(
        tree.to_json(),
        json!({
            "id": "int",
            "customer": "union(missing|str)",
            "amount": "union(float|missing)",
            "placed_at": "timestamp",
            "shipping": {"city": "str", "zip": "union(missing|str)"},
            "tags": ["str"],
            "items": [{"sku": "str", "qty": "union(int|missing)"}],
            "attributes": "union(missing|object)"
        })
    );
    assert_eq!(
        tree.get("tags").map(|n| n.type_of().to_string()),
        Some("union(array|missing)".to_string())
    );
    assert_eq!(
        tree.get("items").map(|n| n.type_of().to_string()),
        Some("array".to_string())
    );
}

#[test]
fn required_paths_use_dotted_names() {
    let raw = spark_schema_to_schema("df", ORDERS).unwrap();
    let required: Vec<&str> = raw.required.iter().collect();
    assert_eq!(
        required,
        vec!["id", "items", "items.sku", "placed_at", "shipping.city"]
    );
}

#[test]
fn nested_arrays() {
    let text = "root\n |-- matrix: array (nullable = false)\n |    |-- element: array (containsNull = false)\n |    |    |-- element: double (containsNull = false)\n";
    let tree = spark_schema_to_schema("df", text)
        .unwrap()
        .canonicalize()
        .unwrap();
    assert_eq!(tree.to_json(), json!({"matrix": [["float"]]}));
}

#[test]
fn maps_simple_types() {
    assert_eq!(map_spark_type("short"), Tag::Int);
    assert_eq!(map_spark_type("double"), Tag::Float);
    assert_eq!(map_spark_type("decimal(38,18)"), Tag::Float);
    assert_eq!(map_spark_type("binary"), Tag::Str);
    assert_eq!(map_spark_type("boolean"), Tag::Bool);
    assert_eq!(map_spark_type("timestamp_ntz"), Tag::Timestamp);
    assert_eq!(map_spark_type("interval day"), Tag::Any);
}

#[test]
fn missing_root_header_is_rejected() {
    let err = spark_schema_to_schema("df", "\n |-- id: long (nullable = true)\n").unwrap_err();
    assert_eq!(
        err,
        SparkSchemaError::MissingRoot {
            line: 2,
            found: "|-- id: long (nullable = true)".to_string(),
        }
    );
}

#[test]
fn errors_carry_line_numbers() {
    let bad_line = "root\n |-- id: long (nullable = true)\n this is not a field\n";
    assert!(matches!(
        spark_schema_to_schema("df", bad_line),
        Err(SparkSchemaError::InvalidLine { line: 3, .. })
    ));

    let bad_indent = "root\n |-- id: long (nullable = true)\n |    |    |-- x: long (nullable = true)\n";
    assert!(matches!(
        spark_schema_to_schema("df", bad_indent),
        Err(SparkSchemaError::InvalidLine { line: 3, .. })
    ));

    let child_of_scalar = "root\n |-- id: long (nullable = true)\n |    |-- x: long (nullable = true)\n";
    assert!(matches!(
        spark_schema_to_schema("df", child_of_scalar),
        Err(SparkSchemaError::InvalidLine { line: 3, .. })
    ));

    let no_element = "root\n |-- tags: array (nullable = true)\n |-- id: long (nullable = true)\n";
    assert_eq!(
        spark_schema_to_schema("df", no_element).unwrap_err(),
        SparkSchemaError::MissingElement {
            line: 2,
            name: "tags".to_string(),
        }
    );
}
