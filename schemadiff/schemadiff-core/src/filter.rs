//! Restriction of a tree to a set of dotted field paths.

use std::collections::btree_map::Entry;

use tracing::debug;

use crate::{SchemaNode, SchemaTree};

/// Keep only the fields named by `patterns`, plus the ancestors needed to
/// reach them.
///
/// Patterns are dotted (`order.items.sku`); a segment may carry an index
/// marker (`items[]`, `items[*]`, `items[0]`), which is equivalent to the bare
/// name since arrays are traversed transparently. A pattern ending on an
/// object or array keeps the whole subtree. A pattern that runs into a leaf
/// (a scalar or an empty object) before its last segment keeps that leaf, so
/// a kind divergence at that position still compares atomically. Patterns
/// that name absent fields are skipped. An empty pattern list returns the
/// tree unchanged.
pub fn filter_tree<S: AsRef<str>>(tree: &SchemaTree, patterns: &[S]) -> SchemaTree {
    if patterns.is_empty() {
        return tree.clone();
    }

    let mut out = SchemaTree::default();
    for pattern in patterns {
        let segments = parse_pattern(pattern.as_ref());
        match select_in_tree(tree, &segments) {
            Some(selected) => merge_trees(&mut out, selected),
            None => debug!(pattern = pattern.as_ref(), "field pattern matched nothing"),
        }
    }
    out
}

fn parse_pattern(pattern: &str) -> Vec<&str> {
    pattern
        .split('.')
        .map(strip_index_marker)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn strip_index_marker(segment: &str) -> &str {
    let segment = segment.trim();
    match segment.find('[') {
        Some(open) if segment.ends_with(']') => &segment[..open],
        _ => segment,
    }
}

fn select_in_tree(tree: &SchemaTree, segments: &[&str]) -> Option<SchemaTree> {
    let (first, rest) = segments.split_first()?;
    let node = tree.get(*first)?;
    let selected = if rest.is_empty() {
        node.clone()
    } else {
        select_in_node(node, rest)?
    };
    Some(SchemaTree::from_iter([(first.to_string(), selected)]))
}

fn select_in_node(node: &SchemaNode, segments: &[&str]) -> Option<SchemaNode> {
    match node {
        SchemaNode::Scalar(_) => Some(node.clone()),
        SchemaNode::Object(fields) if fields.is_empty() => Some(node.clone()),
        SchemaNode::Object(fields) => select_in_tree(fields, segments).map(SchemaNode::Object),
        SchemaNode::Array { element, optional } => {
            select_in_node(element, segments).map(|element| SchemaNode::Array {
                element: Box::new(element),
                optional: *optional,
            })
        }
    }
}

fn merge_trees(into: &mut SchemaTree, from: SchemaTree) {
    for (name, node) in from {
        match into.fields_mut().entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => merge_nodes(slot.get_mut(), node),
        }
    }
}

// Both sides are selections of the same source tree, so their kinds agree.
fn merge_nodes(into: &mut SchemaNode, from: SchemaNode) {
    match (into, from) {
        (SchemaNode::Object(a), SchemaNode::Object(b)) => merge_trees(a, b),
        (SchemaNode::Array { element: a, .. }, SchemaNode::Array { element: b, .. }) => {
            merge_nodes(a, *b)
        }
        _ => {}
    }
}
