//! Schema inference from sample JSON records.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use schemadiff_core::{RawNode, RawSchema, RequiredPathSet, Tag};
use serde_json::{Deserializer, Map, Value};
use tracing::debug;

use crate::JsonSourceError;

/// How sample records are read and typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleOptions {
    /// Read at most this many records; `None` reads all of them.
    pub max_records: Option<usize>,
    /// Type RFC 3339 date-times and `YYYY-MM-DD` dates as `timestamp`
    /// instead of `str`.
    pub detect_timestamps: bool,
}

/// Read sample records from `text`.
///
/// Accepts a single JSON object, a JSON array of objects, or a stream of
/// objects separated by whitespace (NDJSON).
pub fn read_records(
    text: &str,
    options: &SampleOptions,
) -> Result<Vec<Map<String, Value>>, JsonSourceError> {
    let limit = options.max_records.unwrap_or(usize::MAX);
    let mut values = Vec::new();
    for value in Deserializer::from_str(text).into_iter::<Value>() {
        values.push(value?);
        if values.len() >= limit {
            break;
        }
    }

    // A lone top-level array is a list of records.
    if let [Value::Array(_)] = values.as_slice() {
        if let Some(Value::Array(items)) = values.pop() {
            values = items.into_iter().take(limit).collect();
        }
    }

    if values.is_empty() {
        return Err(JsonSourceError::NoRecords);
    }

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(JsonSourceError::NotAnObject {
                index,
                found: kind_name(&other),
            }),
        })
        .collect()
}

/// Infer a raw schema from sample records.
///
/// Every record is one observation of the root object. A field is required
/// when it holds a non-null value in every record; fields below an array are
/// required when present in every element of every record holding the array.
pub fn json_samples_to_schema(
    label: &str,
    text: &str,
    options: &SampleOptions,
) -> Result<RawSchema, JsonSourceError> {
    let records = read_records(text, options)?;
    debug!(label, records = records.len(), "read JSON sample records");

    let tree = RawNode::Variants(
        records
            .iter()
            .map(|record| observe_object(record, options))
            .collect(),
    );

    let mut required = RequiredPathSet::new();
    let roots: Vec<&Map<String, Value>> = records.iter().collect();
    required_in_objects(&roots, "", &mut required);

    // Records are data: an object keyed `list` is a field, never a wrapper.
    Ok(RawSchema::new(tree, required, label).without_list_wrappers())
}

fn observe_object(map: &Map<String, Value>, options: &SampleOptions) -> RawNode {
    RawNode::object(
        map.iter()
            .map(|(name, value)| (name.as_str(), observe(value, options))),
    )
}

fn observe(value: &Value, options: &SampleOptions) -> RawNode {
    match value {
        Value::Null => RawNode::tag(Tag::Missing),
        Value::Bool(_) => RawNode::tag(Tag::Bool),
        Value::Number(n) if n.is_i64() || n.is_u64() => RawNode::tag(Tag::Int),
        Value::Number(_) => RawNode::tag(Tag::Float),
        Value::String(s) if options.detect_timestamps && looks_like_timestamp(s) => {
            RawNode::tag(Tag::Timestamp)
        }
        Value::String(_) => RawNode::tag(Tag::Str),
        Value::Array(items) => RawNode::List(items.iter().map(|v| observe(v, options)).collect()),
        Value::Object(map) => observe_object(map, options),
    }
}

fn looks_like_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Record required paths below `prefix`, given every observation of the
/// object at that position.
fn required_in_objects(objects: &[&Map<String, Value>], prefix: &str, out: &mut RequiredPathSet) {
    let keys: BTreeSet<&String> = objects.iter().flat_map(|o| o.keys()).collect();
    for key in keys {
        let path = join_path(prefix, key);
        let present: Vec<&Value> = objects
            .iter()
            .filter_map(|o| o.get(key.as_str()))
            .filter(|v| !v.is_null())
            .collect();
        let everywhere = present.len() == objects.len();
        if everywhere {
            out.insert(path.clone());
        }

        if present.is_empty() {
            continue;
        }
        if present.iter().all(|v| v.is_array()) {
            required_in_elements(&present, &path, out);
        } else if everywhere {
            if let Some(children) = all_objects(&present) {
                required_in_objects(&children, &path, out);
            }
        }
    }
}

/// Array elements carry no presence of their own: walk into their fields.
fn required_in_elements(arrays: &[&Value], path: &str, out: &mut RequiredPathSet) {
    let elements: Vec<&Value> = arrays
        .iter()
        .filter_map(|v| v.as_array())
        .flatten()
        .collect();
    if elements.is_empty() {
        return;
    }
    if elements.iter().all(|v| v.is_array()) {
        required_in_elements(&elements, path, out);
    } else if let Some(objects) = all_objects(&elements) {
        required_in_objects(&objects, path, out);
    }
}

fn all_objects<'a>(values: &[&'a Value]) -> Option<Vec<&'a Map<String, Value>>> {
    values.iter().map(|v| v.as_object()).collect()
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
