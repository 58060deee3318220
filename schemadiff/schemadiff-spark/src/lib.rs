//! Spark `printSchema()` adapter for the schemadiff pipeline.
//!
//! [`spark_schema_to_schema`] reads the indented tree printed by
//! `DataFrame.printSchema()`:
//!
//! ```text
//! root
//!  |-- id: long (nullable = false)
//!  |-- tags: array (nullable = true)
//!  |    |-- element: string (containsNull = true)
//! ```

mod error;
mod parser;

use schemadiff_core::{RawNode, RawSchema, RequiredPathSet, Tag};
use tracing::{debug, warn};

pub use error::SparkSchemaError;
use parser::{PrintedField, parse_print_schema};

/// Read a `printSchema()` dump. Fields printed with `nullable = false` are
/// required.
pub fn spark_schema_to_schema(label: &str, text: &str) -> Result<RawSchema, SparkSchemaError> {
    let fields = parse_print_schema(text)?;
    debug!(label, fields = fields.len(), "parsed Spark schema");

    let mut required = RequiredPathSet::new();
    let tree = struct_node(&fields, "", &mut required)?;
    Ok(RawSchema::new(tree, required, label))
}

fn struct_node(
    fields: &[PrintedField],
    prefix: &str,
    required: &mut RequiredPathSet,
) -> Result<RawNode, SparkSchemaError> {
    let mut children = Vec::with_capacity(fields.len());
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        if field.nullable == Some(false) {
            required.insert(path.clone());
        }
        children.push((field.name.clone(), field_node(field, &path, required)?));
    }
    Ok(RawNode::object(children))
}

fn field_node(
    field: &PrintedField,
    path: &str,
    required: &mut RequiredPathSet,
) -> Result<RawNode, SparkSchemaError> {
    match field.type_name.as_str() {
        "struct" => struct_node(&field.children, path, required),
        "array" => {
            let element = field
                .children
                .iter()
                .find(|child| child.name == "element")
                .ok_or_else(|| SparkSchemaError::MissingElement {
                    line: field.line,
                    name: field.name.clone(),
                })?;
            // Element fields share the array's dotted path.
            Ok(RawNode::List(vec![field_node(element, path, required)?]))
        }
        "map" => Ok(RawNode::tag(Tag::Object)),
        other => Ok(RawNode::tag(map_spark_type(other))),
    }
}

/// Map a Spark SQL simple type name to its canonical tag.
pub fn map_spark_type(name: &str) -> Tag {
    let base = name.split('(').next().unwrap_or_default().trim();
    match base {
        "byte" | "short" | "integer" | "long" => Tag::Int,
        "float" | "double" | "decimal" => Tag::Float,
        "string" | "binary" | "char" | "varchar" => Tag::Str,
        "boolean" => Tag::Bool,
        "date" | "timestamp" | "timestamp_ntz" => Tag::Timestamp,
        "void" | "null" => Tag::Missing,
        "struct" | "map" => Tag::Object,
        "array" => Tag::Array,
        other => {
            warn!(spark_type = other, "unknown Spark type mapped to any");
            Tag::Any
        }
    }
}
