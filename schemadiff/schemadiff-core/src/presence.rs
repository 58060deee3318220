//! Presence injection: marks every field that is not certain to exist.

use std::collections::{BTreeSet, btree_set};

use crate::{FieldPath, SchemaNode, SchemaTree};

/// Dotted paths (`a.b.c`) of fields certain to be present.
///
/// Paths carry no array index notation: a path below an array applies to
/// every element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredPathSet(BTreeSet<String>);

impl RequiredPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.0.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredPathSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for RequiredPathSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for RequiredPathSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Return a copy of `tree` where every field whose path is not in `required`
/// is optionalized.
///
/// Scalars gain `missing`; arrays become `union(array|missing)` at their own
/// position while their elements stay untouched; objects are never
/// optionalized themselves, their fields carry their own presence.
pub fn inject_presence(tree: &SchemaTree, required: &RequiredPathSet) -> SchemaTree {
    inject_tree(tree, &FieldPath::root(), required)
}

fn inject_tree(tree: &SchemaTree, prefix: &FieldPath, required: &RequiredPathSet) -> SchemaTree {
    tree.iter()
        .map(|(name, node)| {
            let path = prefix.child(name);
            let node = inject_node(node, &path, required);
            let node = if required.contains(&path.required_key()) {
                node
            } else {
                optionalize(node)
            };
            (name.clone(), node)
        })
        .collect()
}

fn inject_node(node: &SchemaNode, path: &FieldPath, required: &RequiredPathSet) -> SchemaNode {
    match node {
        SchemaNode::Scalar(_) => node.clone(),
        SchemaNode::Object(fields) => SchemaNode::Object(inject_tree(fields, path, required)),
        SchemaNode::Array { element, optional } => SchemaNode::Array {
            element: Box::new(inject_node(element, &path.element(), required)),
            optional: *optional,
        },
    }
}

fn optionalize(node: SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Scalar(ty) => SchemaNode::Scalar(ty.with_missing()),
        SchemaNode::Array { element, .. } => SchemaNode::Array {
            element,
            optional: true,
        },
        SchemaNode::Object(_) => node,
    }
}
