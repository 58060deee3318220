//! JSON Schema adapter.

use std::collections::BTreeMap;

use schemadiff_core::{CanonicalType, RawNode, RawSchema, RequiredPathSet, Tag};
use serde_json::{Map, Value};
use tracing::debug;

use crate::JsonSourceError;

/// Read a JSON Schema document describing an object.
///
/// The label is the schema `title`, or `fallback_label` when it has none.
pub fn json_schema_to_schema(
    fallback_label: &str,
    text: &str,
) -> Result<RawSchema, JsonSourceError> {
    let root: Value = serde_json::from_str(text)?;
    let label = root
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(fallback_label)
        .to_string();

    let mut walker = Walker {
        root: &root,
        resolving: Vec::new(),
        required: RequiredPathSet::new(),
    };
    let tree = walker.node(&root, "")?;
    if !matches!(tree, RawNode::Object(_)) {
        return Err(invalid("", "root schema must describe an object with properties"));
    }
    debug!(label = %label, required = walker.required.len(), "read JSON Schema");

    Ok(RawSchema::new(tree, walker.required, label))
}

struct Walker<'a> {
    root: &'a Value,
    /// `$ref` targets currently being expanded, for cycle detection.
    resolving: Vec<&'a str>,
    required: RequiredPathSet,
}

impl<'a> Walker<'a> {
    fn node(&mut self, schema: &'a Value, path: &str) -> Result<RawNode, JsonSourceError> {
        let schema = match schema {
            Value::Object(map) => map,
            Value::Bool(_) => return Ok(RawNode::tag(Tag::Any)),
            _ => return Err(invalid(path, "a schema must be an object or a boolean")),
        };

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return self.reference(reference, path);
        }
        if let Some(branches) = schema.get("anyOf").or_else(|| schema.get("oneOf")) {
            return self.alternatives(branches, path);
        }
        if let Some(parts) = schema.get("allOf") {
            return self.all_of(schema, parts, path);
        }

        match schema.get("type") {
            Some(Value::String(name)) => self.typed(schema, name, path),
            Some(Value::Array(names)) => {
                let variants = names
                    .iter()
                    .map(|name| match name.as_str() {
                        Some(name) => self.typed(schema, name, path),
                        None => Err(invalid(path, "'type' entries must be strings")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawNode::Variants(variants))
            }
            Some(_) => Err(invalid(path, "'type' must be a string or an array of strings")),
            None => self.untyped(schema, path),
        }
    }

    fn typed(
        &mut self,
        schema: &'a Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Result<RawNode, JsonSourceError> {
        let node = match name {
            "string" => match schema.get("format").and_then(Value::as_str) {
                Some("date-time" | "date") => RawNode::tag(Tag::Timestamp),
                _ => RawNode::tag(Tag::Str),
            },
            "integer" => RawNode::tag(Tag::Int),
            "number" => RawNode::tag(Tag::Float),
            "boolean" => RawNode::tag(Tag::Bool),
            "null" => RawNode::tag(Tag::Missing),
            "object" => self.object(schema, path)?,
            "array" => self.array(schema, path)?,
            other => return Err(invalid(path, format!("unknown type '{other}'"))),
        };
        Ok(node)
    }

    fn untyped(
        &mut self,
        schema: &'a Map<String, Value>,
        path: &str,
    ) -> Result<RawNode, JsonSourceError> {
        if schema.contains_key("properties") {
            return self.object(schema, path);
        }
        if schema.contains_key("items") {
            return self.array(schema, path);
        }
        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            return Ok(literal_type(values.iter()));
        }
        if let Some(value) = schema.get("const") {
            return Ok(literal_type(std::iter::once(value)));
        }
        Ok(RawNode::tag(Tag::Any))
    }

    fn object(
        &mut self,
        schema: &'a Map<String, Value>,
        path: &str,
    ) -> Result<RawNode, JsonSourceError> {
        let properties = match schema.get("properties") {
            Some(Value::Object(props)) if !props.is_empty() => props,
            Some(Value::Object(_)) | None => return Ok(RawNode::tag(Tag::Object)),
            Some(_) => return Err(invalid(path, "'properties' must be an object")),
        };

        if let Some(required) = schema.get("required") {
            let names = required
                .as_array()
                .ok_or_else(|| invalid(path, "'required' must be an array"))?;
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| invalid(path, "'required' entries must be strings"))?;
                self.required.insert(join_path(path, name));
            }
        }

        let mut fields = BTreeMap::new();
        for (name, sub) in properties {
            let node = self.node(sub, &join_path(path, name))?;
            fields.insert(name.clone(), node);
        }
        Ok(RawNode::Object(fields))
    }

    fn array(
        &mut self,
        schema: &'a Map<String, Value>,
        path: &str,
    ) -> Result<RawNode, JsonSourceError> {
        // Element paths share the array's dotted path.
        let elements = match schema.get("items") {
            None => vec![RawNode::tag(Tag::Any)],
            Some(Value::Array(tuple)) => tuple
                .iter()
                .map(|item| self.node(item, path))
                .collect::<Result<Vec<_>, _>>()?,
            Some(item) => vec![self.node(item, path)?],
        };
        Ok(RawNode::List(elements))
    }

    fn reference(&mut self, reference: &'a str, path: &str) -> Result<RawNode, JsonSourceError> {
        if self.resolving.contains(&reference) {
            debug!(reference, path, "recursive $ref folded to object");
            return Ok(RawNode::tag(Tag::Object));
        }

        let target = reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
            .ok_or_else(|| JsonSourceError::UnresolvedRef {
                reference: reference.to_string(),
            })?;

        self.resolving.push(reference);
        let node = self.node(target, path);
        self.resolving.pop();
        node
    }

    /// `anyOf` / `oneOf`: every branch is an observation of the same field. A
    /// nested field stays required only if every non-null branch requires it.
    fn alternatives(&mut self, branches: &'a Value, path: &str) -> Result<RawNode, JsonSourceError> {
        let branches = branches
            .as_array()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| invalid(path, "'anyOf'/'oneOf' must be a non-empty array"))?;

        let outer = std::mem::take(&mut self.required);
        let mut shared: Option<RequiredPathSet> = None;
        let mut variants = Vec::with_capacity(branches.len());
        for branch in branches {
            let node = self.node(branch, path);
            let branch_required = std::mem::take(&mut self.required);
            let node = match node {
                Ok(node) => node,
                Err(e) => {
                    self.required = outer;
                    return Err(e);
                }
            };
            if !is_null_type(&node) {
                shared = Some(match shared {
                    None => branch_required,
                    Some(prev) => prev
                        .iter()
                        .filter(|p| branch_required.contains(p))
                        .collect(),
                });
            }
            variants.push(node);
        }

        self.required = outer;
        self.required.extend(shared.unwrap_or_default());
        Ok(RawNode::Variants(variants))
    }

    /// `allOf`: object parts are merged field by field, including the
    /// schema's own properties; anything else is folded as observations.
    fn all_of(
        &mut self,
        schema: &'a Map<String, Value>,
        parts: &'a Value,
        path: &str,
    ) -> Result<RawNode, JsonSourceError> {
        let parts = parts
            .as_array()
            .ok_or_else(|| invalid(path, "'allOf' must be an array"))?;

        let mut nodes = parts
            .iter()
            .map(|part| self.node(part, path))
            .collect::<Result<Vec<_>, _>>()?;
        if schema.contains_key("properties") {
            nodes.push(self.object(schema, path)?);
        }

        if !nodes.iter().all(|n| matches!(n, RawNode::Object(_))) {
            return Ok(RawNode::Variants(nodes));
        }
        let mut merged: BTreeMap<String, RawNode> = BTreeMap::new();
        for node in nodes {
            let RawNode::Object(fields) = node else {
                continue;
            };
            for (name, field) in fields {
                let slot = merged.remove(&name);
                let combined = match slot {
                    None => field,
                    Some(RawNode::Variants(mut seen)) => {
                        seen.push(field);
                        RawNode::Variants(seen)
                    }
                    Some(prev) => RawNode::Variants(vec![prev, field]),
                };
                merged.insert(name, combined);
            }
        }
        Ok(RawNode::Object(merged))
    }
}

/// Type of an `enum` / `const` without an explicit `type`.
fn literal_type<'v>(values: impl Iterator<Item = &'v Value>) -> RawNode {
    let tags = values.map(|value| match value {
        Value::Null => Tag::Missing,
        Value::Bool(_) => Tag::Bool,
        Value::Number(n) if n.is_i64() || n.is_u64() => Tag::Int,
        Value::Number(_) => Tag::Float,
        Value::String(_) => Tag::Str,
        Value::Array(_) => Tag::Array,
        Value::Object(_) => Tag::Object,
    });
    CanonicalType::from_tags(tags)
        .map(RawNode::Type)
        .unwrap_or_else(|| RawNode::tag(Tag::Any))
}

fn is_null_type(node: &RawNode) -> bool {
    matches!(node, RawNode::Type(ty) if ty.tags().all(|t| t == Tag::Missing))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn invalid(path: &str, detail: impl Into<String>) -> JsonSourceError {
    JsonSourceError::InvalidSchema {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        detail: detail.into(),
    }
}
