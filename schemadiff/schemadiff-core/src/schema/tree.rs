use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    ops::Deref,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FieldPath;
use crate::{CanonicalType, SchemaError, Tag};

/// Canonical schema node.
///
/// Variant names mirror the wire notation: a type string, `[X]`, or a nested
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaNode {
    Scalar(CanonicalType),
    /// Array whose elements all have the generalized shape `element`.
    ///
    /// `optional` is the presence of the array field itself, rendered as
    /// `union(array|missing)`; it never applies to the elements.
    Array {
        element: Box<SchemaNode>,
        optional: bool,
    },
    Object(SchemaTree),
}

impl SchemaNode {
    pub fn scalar(ty: impl Into<CanonicalType>) -> Self {
        SchemaNode::Scalar(ty.into())
    }

    pub fn array(element: SchemaNode) -> Self {
        SchemaNode::Array {
            element: Box::new(element),
            optional: false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, SchemaNode::Scalar(_))
    }

    /// The node's own type: the scalar type, `array` (optionally with
    /// `missing`), or `object`.
    pub fn type_of(&self) -> CanonicalType {
        match self {
            SchemaNode::Scalar(ty) => ty.clone(),
            SchemaNode::Array { optional: false, .. } => CanonicalType::scalar(Tag::Array),
            SchemaNode::Array { optional: true, .. } => {
                CanonicalType::scalar(Tag::Array).with_missing()
            }
            SchemaNode::Object(_) => CanonicalType::scalar(Tag::Object),
        }
    }

    fn from_json(value: &Value, path: &FieldPath) -> Result<Self, SchemaError> {
        match value {
            Value::String(s) => s
                .parse::<CanonicalType>()
                .map(SchemaNode::Scalar)
                .map_err(|e| SchemaError::malformed_tree(path, e.to_string())),
            Value::Object(map) => SchemaTree::from_json_map(map, path).map(SchemaNode::Object),
            Value::Array(items) => match items.as_slice() {
                [element] => Ok(SchemaNode::array(SchemaNode::from_json(
                    element,
                    &path.element(),
                )?)),
                _ => Err(SchemaError::malformed_tree(
                    path,
                    format!("array marker must hold exactly one element, found {}", items.len()),
                )),
            },
            other => Err(SchemaError::malformed_tree(
                path,
                format!("unexpected JSON value {other}"),
            )),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            SchemaNode::Scalar(ty) => Value::String(ty.to_string()),
            SchemaNode::Array { element, .. } => Value::Array(vec![element.to_json()]),
            SchemaNode::Object(tree) => tree.to_json(),
        }
    }
}

/// Mapping from field name to [`SchemaNode`]; the body of every object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTree(BTreeMap<String, SchemaNode>);

impl SchemaTree {
    pub fn new(fields: BTreeMap<String, SchemaNode>) -> Self {
        Self(fields)
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.0.insert(name.into(), node)
    }

    pub(crate) fn fields_mut(&mut self) -> &mut BTreeMap<String, SchemaNode> {
        &mut self.0
    }

    /// Parse the wire notation: type strings, nested objects and one-element
    /// arrays `[X]`.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Self::from_json_map(map, &FieldPath::root()),
            _ => Err(SchemaError::malformed_tree(
                FieldPath::root(),
                "schema root must be a JSON object",
            )),
        }
    }

    fn from_json_map(map: &Map<String, Value>, path: &FieldPath) -> Result<Self, SchemaError> {
        map.iter()
            .map(|(name, value)| {
                SchemaNode::from_json(value, &path.child(name)).map(|node| (name.clone(), node))
            })
            .collect()
    }

    /// Render the wire notation. Array presence is not part of it.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, node)| (name.clone(), node.to_json()))
                .collect(),
        )
    }
}

impl Deref for SchemaTree {
    type Target = BTreeMap<String, SchemaNode>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(String, SchemaNode)> for SchemaTree {
    fn from_iter<T: IntoIterator<Item = (String, SchemaNode)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, SchemaNode>> for SchemaTree {
    fn from(value: BTreeMap<String, SchemaNode>) -> Self {
        Self(value)
    }
}

impl IntoIterator for SchemaTree {
    type Item = (String, SchemaNode);
    type IntoIter = std::collections::btree_map::IntoIter<String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Display for SchemaTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let text = super::format_schema_tree(self)?;
        f.write_str(&text)
    }
}
