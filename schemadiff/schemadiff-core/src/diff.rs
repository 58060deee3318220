//! Structural comparison of two canonical trees.

use std::collections::BTreeMap;

use crate::{CanonicalType, FieldPath, SchemaNode, SchemaTree};

/// Types found at one path on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeChange {
    pub old: CanonicalType,
    pub new: CanonicalType,
}

impl TypeChange {
    pub fn is_change(&self) -> bool {
        self.old != self.new
    }
}

/// Raw comparison result between a left and a right tree.
///
/// Paths are leaf positions: scalars, arrays (their own path), scalar array
/// elements (`tags[]`) and empty objects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    only_left: BTreeMap<FieldPath, CanonicalType>,
    only_right: BTreeMap<FieldPath, CanonicalType>,
    common: BTreeMap<FieldPath, TypeChange>,
}

impl Delta {
    pub fn only_left(&self) -> &BTreeMap<FieldPath, CanonicalType> {
        &self.only_left
    }

    pub fn only_right(&self) -> &BTreeMap<FieldPath, CanonicalType> {
        &self.only_right
    }

    /// Every path present on both sides, whether or not the types agree.
    pub fn common(&self) -> &BTreeMap<FieldPath, TypeChange> {
        &self.common
    }

    /// Common paths whose types differ.
    pub fn changed(&self) -> impl Iterator<Item = (&FieldPath, &TypeChange)> {
        self.common.iter().filter(|(_, change)| change.is_change())
    }

    pub fn is_empty(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty() && self.changed().next().is_none()
    }
}

/// Compare two canonical, presence-injected trees.
///
/// When the structural kind diverges at a path (scalar vs object vs array) the
/// difference is recorded once, as a type change at that path; the children
/// of the structured side are not reported as added or removed.
pub fn diff_trees(left: &SchemaTree, right: &SchemaTree) -> Delta {
    let mut delta = Delta::default();
    diff_tree(left, right, &FieldPath::root(), &mut delta);
    delta
}

fn diff_tree(left: &SchemaTree, right: &SchemaTree, prefix: &FieldPath, delta: &mut Delta) {
    for (name, l) in left.iter() {
        let path = prefix.child(name);
        match right.get(name) {
            Some(r) => diff_node(l, r, &path, delta),
            None => collect_paths(l, &path, &mut delta.only_left),
        }
    }
    for (name, r) in right.iter() {
        if !left.contains_key(name) {
            collect_paths(r, &prefix.child(name), &mut delta.only_right);
        }
    }
}

fn diff_node(left: &SchemaNode, right: &SchemaNode, path: &FieldPath, delta: &mut Delta) {
    match (left, right) {
        (SchemaNode::Object(l), SchemaNode::Object(r)) if l.is_empty() && r.is_empty() => {
            record_common(path, left, right, delta);
        }
        (SchemaNode::Object(l), SchemaNode::Object(r)) => diff_tree(l, r, path, delta),
        (SchemaNode::Array { element: l, .. }, SchemaNode::Array { element: r, .. }) => {
            record_common(path, left, right, delta);
            diff_node(l, r, &path.element(), delta);
        }
        _ => record_common(path, left, right, delta),
    }
}

fn record_common(path: &FieldPath, left: &SchemaNode, right: &SchemaNode, delta: &mut Delta) {
    delta.common.insert(
        path.clone(),
        TypeChange {
            old: left.type_of(),
            new: right.type_of(),
        },
    );
}

/// Leaf paths of a subtree present on one side only.
///
/// A scalar array element is not listed separately: the array path already
/// covers it.
fn collect_paths(node: &SchemaNode, path: &FieldPath, out: &mut BTreeMap<FieldPath, CanonicalType>) {
    match node {
        SchemaNode::Scalar(ty) => {
            out.insert(path.clone(), ty.clone());
        }
        SchemaNode::Object(fields) if fields.is_empty() => {
            out.insert(path.clone(), node.type_of());
        }
        SchemaNode::Object(fields) => {
            for (name, child) in fields.iter() {
                collect_paths(child, &path.child(name), out);
            }
        }
        SchemaNode::Array { element, .. } => {
            out.insert(path.clone(), node.type_of());
            if !element.is_primitive() {
                collect_paths(element, &path.element(), out);
            }
        }
    }
}
