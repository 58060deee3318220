//! Parser-facing raw tree, before normalization.

use std::collections::BTreeMap;

use crate::{CanonicalType, NormalizeOptions, RequiredPathSet, SchemaError, SchemaTree, Tag};

/// Tree shape as produced by a format adapter.
///
/// Unlike [`SchemaNode`](crate::SchemaNode) it may hold several observations
/// for one path and format-specific list wrappers; the
/// [normalizer](crate::normalize) folds those into canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    Type(CanonicalType),
    Object(BTreeMap<String, RawNode>),
    /// Array; one entry per observed element (possibly none).
    List(Vec<RawNode>),
    /// The same field observed with several shapes, e.g. once per sampled record.
    Variants(Vec<RawNode>),
}

impl RawNode {
    pub fn tag(tag: Tag) -> Self {
        RawNode::Type(CanonicalType::scalar(tag))
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, RawNode)>,
        K: Into<String>,
    {
        RawNode::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Output of a format adapter: the raw tree, the paths certain to be present,
/// and a human-readable label for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSchema {
    pub tree: RawNode,
    pub required: RequiredPathSet,
    pub label: String,
    pub normalize: NormalizeOptions,
}

impl RawSchema {
    pub fn new(tree: RawNode, required: RequiredPathSet, label: impl Into<String>) -> Self {
        Self {
            tree,
            required,
            label: label.into(),
            normalize: NormalizeOptions::default(),
        }
    }

    /// Keep objects named `list` as plain objects.
    pub fn without_list_wrappers(mut self) -> Self {
        self.normalize.unwrap_list_wrappers = false;
        self
    }

    /// Normalize the raw tree and inject presence from the required paths.
    pub fn canonicalize(&self) -> Result<SchemaTree, SchemaError> {
        crate::canonicalize_with(&self.tree, &self.required, &self.normalize)
    }
}
