//! dbt model adapter: compiled `manifest.json` and `schema.yml` files.

use std::collections::{BTreeMap, BTreeSet};

use schemadiff_core::{RawNode, RawSchema, RequiredPathSet, Tag};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{SqlSourceError, parse_sql_type};

const MODEL_RESOURCE_TYPES: [&str; 3] = ["model", "seed", "snapshot"];
const REQUIRING_TESTS: [&str; 2] = ["not_null", "unique"];

/// Which model of a dbt document to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DbtOptions {
    /// Model name (case-insensitive) or manifest unique id. Required when the
    /// document defines more than one model.
    pub model: Option<String>,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    nodes: BTreeMap<String, ManifestNode>,
}

#[derive(Deserialize)]
struct ManifestNode {
    resource_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    columns: BTreeMap<String, ManifestColumn>,
    #[serde(default)]
    attached_node: Option<String>,
    #[serde(default)]
    column_name: Option<String>,
    #[serde(default)]
    test_metadata: Option<TestMetadata>,
}

#[derive(Deserialize)]
struct ManifestColumn {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

#[derive(Deserialize)]
struct Constraint {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct TestMetadata {
    name: String,
}

#[derive(Deserialize)]
struct SchemaYaml {
    #[serde(default)]
    models: Vec<YamlModel>,
}

#[derive(Deserialize)]
struct YamlModel {
    name: String,
    #[serde(default)]
    columns: Vec<YamlColumn>,
}

#[derive(Deserialize)]
struct YamlColumn {
    name: String,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default)]
    data_tests: Vec<serde_yaml::Value>,
    #[serde(default)]
    tests: Vec<serde_yaml::Value>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

/// A column as seen by both dbt formats.
struct ColumnSpec<'a> {
    name: &'a str,
    data_type: Option<&'a str>,
    required: bool,
}

/// Read a model from a compiled dbt `manifest.json`.
///
/// A column is required when it carries a `not_null` constraint or when a
/// `not_null` / `unique` test is attached to it.
pub fn dbt_manifest_to_schema(
    text: &str,
    options: &DbtOptions,
) -> Result<RawSchema, SqlSourceError> {
    let manifest: Manifest = serde_json::from_str(text)?;

    let models: Vec<(&String, &ManifestNode)> = manifest
        .nodes
        .iter()
        .filter(|(_, node)| MODEL_RESOURCE_TYPES.contains(&node.resource_type.as_str()))
        .collect();
    let index = select_model(
        &models
            .iter()
            .map(|(id, node)| (id.as_str(), node.name.as_str()))
            .collect::<Vec<_>>(),
        options.model.as_deref(),
    )?;
    let (unique_id, model) = models[index];

    let tested: BTreeSet<&str> = manifest
        .nodes
        .values()
        .filter(|node| node.resource_type == "test")
        .filter(|node| node.attached_node.as_deref() == Some(unique_id.as_str()))
        .filter(|node| {
            node.test_metadata
                .as_ref()
                .is_some_and(|meta| REQUIRING_TESTS.contains(&meta.name.as_str()))
        })
        .filter_map(|node| node.column_name.as_deref())
        .collect();
    debug!(model = %model.name, tested_columns = tested.len(), "read dbt manifest");

    let columns = model.columns.iter().map(|(key, column)| {
        let name = column.name.as_deref().unwrap_or(key);
        ColumnSpec {
            name,
            data_type: column.data_type.as_deref(),
            required: tested.contains(name) || has_not_null_constraint(&column.constraints),
        }
    });
    build_schema(&model.name, columns)
}

/// Read a model from a dbt `schema.yml`.
///
/// A column is required when it has a `not_null` / `unique` test (under
/// `data_tests` or `tests`) or a `not_null` constraint.
pub fn dbt_yaml_to_schema(text: &str, options: &DbtOptions) -> Result<RawSchema, SqlSourceError> {
    let document: SchemaYaml = serde_yaml::from_str(text)?;

    let index = select_model(
        &document
            .models
            .iter()
            .map(|m| (m.name.as_str(), m.name.as_str()))
            .collect::<Vec<_>>(),
        options.model.as_deref(),
    )?;
    let model = &document.models[index];

    let columns = model.columns.iter().map(|column| ColumnSpec {
        name: &column.name,
        data_type: column.data_type.as_deref(),
        required: column
            .data_tests
            .iter()
            .chain(&column.tests)
            .any(is_requiring_test)
            || has_not_null_constraint(&column.constraints),
    });
    build_schema(&model.name, columns)
}

/// Pick a model from `(id, name)` pairs, by id or case-insensitive name.
fn select_model(models: &[(&str, &str)], wanted: Option<&str>) -> Result<usize, SqlSourceError> {
    let names = || models.iter().map(|(_, name)| name.to_string()).collect::<Vec<_>>();

    let Some(wanted) = wanted else {
        return match models.len() {
            0 => Err(SqlSourceError::NoModels),
            1 => Ok(0),
            _ => Err(SqlSourceError::AmbiguousModel {
                candidates: names(),
            }),
        };
    };

    let matching: Vec<usize> = models
        .iter()
        .enumerate()
        .filter(|(_, (id, name))| *id == wanted || name.eq_ignore_ascii_case(wanted))
        .map(|(i, _)| i)
        .collect();
    match matching.as_slice() {
        [i] => Ok(*i),
        [] if models.is_empty() => Err(SqlSourceError::NoModels),
        [] => Err(SqlSourceError::ModelNotFound {
            model: wanted.to_string(),
            candidates: names(),
        }),
        several => Err(SqlSourceError::AmbiguousModel {
            candidates: several.iter().map(|&i| models[i].0.to_string()).collect(),
        }),
    }
}

/// Build the raw tree; dotted column names (`address.city`) nest objects.
fn build_schema<'a>(
    label: &str,
    columns: impl Iterator<Item = ColumnSpec<'a>>,
) -> Result<RawSchema, SqlSourceError> {
    let mut fields: BTreeMap<String, RawNode> = BTreeMap::new();
    let mut required = RequiredPathSet::new();

    for column in columns {
        if column.required {
            required.insert(column.name);
        }
        let node = match column.data_type.map(str::trim) {
            None | Some("") => RawNode::tag(Tag::Any),
            Some(data_type) => match parse_sql_type(data_type) {
                Ok(ty) => ty.to_raw(column.name, &mut required),
                Err(e) => {
                    warn!(column = column.name, error = %e, "unparsable data_type mapped to any");
                    RawNode::tag(Tag::Any)
                }
            },
        };
        insert_dotted(&mut fields, column.name, node);
    }

    Ok(RawSchema::new(RawNode::Object(fields), required, label))
}

fn insert_dotted(fields: &mut BTreeMap<String, RawNode>, name: &str, node: RawNode) {
    match name.split_once('.') {
        None => {
            fields.insert(name.to_string(), node);
        }
        Some((head, rest)) => {
            let slot = fields
                .entry(head.to_string())
                .or_insert_with(|| RawNode::Object(BTreeMap::new()));
            if !matches!(slot, RawNode::Object(_)) {
                warn!(column = name, "column nested below a non-struct column");
                *slot = RawNode::Object(BTreeMap::new());
            }
            if let RawNode::Object(children) = slot {
                insert_dotted(children, rest, node);
            }
        }
    }
}

fn has_not_null_constraint(constraints: &[Constraint]) -> bool {
    constraints.iter().any(|c| c.kind == "not_null")
}

/// `- not_null`, `- not_null: {...}` or `- unique`.
fn is_requiring_test(test: &serde_yaml::Value) -> bool {
    match test {
        serde_yaml::Value::String(name) => REQUIRING_TESTS.contains(&name.as_str()),
        serde_yaml::Value::Mapping(map) => map
            .keys()
            .filter_map(serde_yaml::Value::as_str)
            .any(|name| REQUIRING_TESTS.contains(&name)),
        _ => false,
    }
}
