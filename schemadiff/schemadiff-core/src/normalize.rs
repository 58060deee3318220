//! Folding of adapter output into canonical [`SchemaTree`] form.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{CanonicalType, FieldPath, RawNode, SchemaError, SchemaNode, SchemaTree, Tag};

/// Key of the outer object of a list wrapper (`{"list": {"element": X}}`).
pub const LIST_WRAPPER_KEY: &str = "list";
/// Key holding one element inside a list wrapper.
pub const ELEMENT_WRAPPER_KEY: &str = "element";

/// Normalization switches chosen by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Rewrite `{"list": {"element": X}}` wrappers to arrays. Sources whose
    /// objects are observed data rather than schema descriptions turn this off.
    pub unwrap_list_wrappers: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            unwrap_list_wrappers: true,
        }
    }
}

#[derive(Debug, Default)]
struct FoldStats {
    unwrap_list_wrappers: bool,
    unwrapped: usize,
    mixed_kinds: usize,
}

/// Shapes observed at one path, split by kind.
#[derive(Default)]
struct Observations<'a> {
    tags: BTreeSet<Tag>,
    objects: Vec<&'a BTreeMap<String, RawNode>>,
    placeholders: usize,
    lists: usize,
    elements: Vec<&'a RawNode>,
}

/// Normalize a raw adapter tree into a canonical tree.
///
/// List wrappers are rewritten to arrays at every depth, and paths observed
/// with several shapes are folded into one. The root must fold to an object.
pub fn normalize(raw: &RawNode) -> Result<SchemaTree, SchemaError> {
    normalize_with(raw, &NormalizeOptions::default())
}

/// [`normalize`] with explicit switches.
pub fn normalize_with(
    raw: &RawNode,
    options: &NormalizeOptions,
) -> Result<SchemaTree, SchemaError> {
    let mut stats = FoldStats {
        unwrap_list_wrappers: options.unwrap_list_wrappers,
        ..FoldStats::default()
    };
    let root = fold(&[raw], &FieldPath::root(), &mut stats)?;
    debug!(
        unwrapped = stats.unwrapped,
        mixed_kinds = stats.mixed_kinds,
        "normalized raw tree"
    );

    match root {
        SchemaNode::Object(tree) => Ok(tree),
        other => Err(SchemaError::malformed_tree(
            FieldPath::root(),
            format!("root must be an object, found {}", other.type_of()),
        )),
    }
}

fn fold(
    observed: &[&RawNode],
    path: &FieldPath,
    stats: &mut FoldStats,
) -> Result<SchemaNode, SchemaError> {
    let obs = collect(observed, path, stats)?;

    let has_objects = !obs.objects.is_empty() || obs.placeholders > 0;
    let has_lists = obs.lists > 0;
    // Nulls next to a single structural kind are a presence signal, not a shape.
    let only_nulls = obs.tags.iter().all(|t| *t == Tag::Missing);

    match (has_objects, has_lists) {
        (true, false) if only_nulls => fold_objects(&obs.objects, path, stats),
        (false, true) if only_nulls => fold_elements(&obs.elements, path, stats),
        (false, false) => CanonicalType::from_tags(obs.tags)
            .map(SchemaNode::Scalar)
            .ok_or_else(|| SchemaError::malformed_tree(path, "no type observed")),
        _ => {
            stats.mixed_kinds += 1;
            debug!(path = %path, "mixed structural kinds folded to a scalar union");
            let kinds = has_objects
                .then_some(Tag::Object)
                .into_iter()
                .chain(has_lists.then_some(Tag::Array));
            CanonicalType::from_tags(obs.tags.into_iter().chain(kinds))
                .map(SchemaNode::Scalar)
                .ok_or_else(|| SchemaError::malformed_tree(path, "no type observed"))
        }
    }
}

fn collect<'a>(
    observed: &[&'a RawNode],
    path: &FieldPath,
    stats: &mut FoldStats,
) -> Result<Observations<'a>, SchemaError> {
    if observed.is_empty() {
        return Err(SchemaError::malformed_tree(path, "empty observation set"));
    }

    let mut obs = Observations::default();
    let mut pending: Vec<&'a RawNode> = observed.to_vec();

    while let Some(node) = pending.pop() {
        match node {
            RawNode::Variants(variants) => {
                if variants.is_empty() {
                    return Err(SchemaError::malformed_tree(path, "empty observation set"));
                }
                pending.extend(variants.iter());
            }
            RawNode::Type(ty) => obs.tags.extend(ty.tags()),
            RawNode::List(items) => {
                obs.lists += 1;
                obs.elements.extend(items.iter());
            }
            RawNode::Object(fields) if fields.is_empty() => obs.placeholders += 1,
            RawNode::Object(fields) if !stats.unwrap_list_wrappers => obs.objects.push(fields),
            RawNode::Object(fields) => match unwrap_list_wrapper(fields) {
                Some(Wrapper::Empty) => {
                    stats.unwrapped += 1;
                    obs.placeholders += 1;
                }
                Some(Wrapper::Elements(items)) => {
                    stats.unwrapped += 1;
                    obs.lists += 1;
                    obs.elements.extend(items);
                }
                None => obs.objects.push(fields),
            },
        }
    }

    Ok(obs)
}

enum Wrapper<'a> {
    /// `{"list": {}}` or `{"list": []}`: a list whose element was never described.
    Empty,
    Elements(Vec<&'a RawNode>),
}

/// Recognize `{"list": {"element": X}}`, `{"list": [{"element": X}, ...]}`
/// and the empty forms `{"list": {}}` / `{"list": []}`.
fn unwrap_list_wrapper(fields: &BTreeMap<String, RawNode>) -> Option<Wrapper<'_>> {
    if fields.len() != 1 {
        return None;
    }
    match fields.get(LIST_WRAPPER_KEY)? {
        RawNode::Object(inner) if inner.is_empty() => Some(Wrapper::Empty),
        RawNode::Object(inner) => wrapped_element(inner).map(|e| Wrapper::Elements(vec![e])),
        RawNode::List(items) if items.is_empty() => Some(Wrapper::Empty),
        RawNode::List(items) => items
            .iter()
            .map(|item| match item {
                RawNode::Object(inner) => wrapped_element(inner),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Wrapper::Elements),
        _ => None,
    }
}

fn wrapped_element(inner: &BTreeMap<String, RawNode>) -> Option<&RawNode> {
    if inner.len() == 1 {
        inner.get(ELEMENT_WRAPPER_KEY)
    } else {
        None
    }
}

fn fold_objects(
    objects: &[&BTreeMap<String, RawNode>],
    path: &FieldPath,
    stats: &mut FoldStats,
) -> Result<SchemaNode, SchemaError> {
    let mut by_key: BTreeMap<&str, Vec<&RawNode>> = BTreeMap::new();
    for fields in objects {
        for (name, node) in fields.iter() {
            by_key.entry(name.as_str()).or_default().push(node);
        }
    }

    let mut tree = SchemaTree::default();
    for (name, observed) in by_key {
        let node = fold(&observed, &path.child(name), stats)?;
        tree.insert(name, node);
    }
    Ok(SchemaNode::Object(tree))
}

fn fold_elements(
    elements: &[&RawNode],
    path: &FieldPath,
    stats: &mut FoldStats,
) -> Result<SchemaNode, SchemaError> {
    let element = if elements.is_empty() {
        // Only empty lists were observed.
        SchemaNode::Scalar(CanonicalType::scalar(Tag::Any))
    } else {
        fold(elements, &path.element(), stats)?
    };
    Ok(SchemaNode::array(element))
}
