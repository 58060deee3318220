//! Comparison entry points.

use std::borrow::Cow;

use tracing::{debug, info_span};

use crate::{
    NormalizeOptions, RawNode, Report, ReportOptions, RequiredPathSet, SchemaError, SchemaTree,
    build_report, detect_path_changes, diff_trees, filter_tree, inject_presence, normalize_with,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Dotted field patterns applied to both sides before diffing; empty keeps everything.
    pub fields: Vec<String>,
    pub include_presence: bool,
    pub detect_path_changes: bool,
    pub left_label: String,
    pub right_label: String,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            include_presence: true,
            detect_path_changes: true,
            left_label: "left".to_string(),
            right_label: "right".to_string(),
        }
    }
}

/// Compare two canonical, presence-injected trees.
pub fn compare(left: &SchemaTree, right: &SchemaTree, options: &CompareOptions) -> Report {
    let _span = info_span!(
        "compare",
        left = %options.left_label,
        right = %options.right_label
    )
    .entered();

    let (left, right) = if options.fields.is_empty() {
        (Cow::Borrowed(left), Cow::Borrowed(right))
    } else {
        (
            Cow::Owned(filter_tree(left, &options.fields)),
            Cow::Owned(filter_tree(right, &options.fields)),
        )
    };

    let delta = diff_trees(&left, &right);
    debug!(
        only_left = delta.only_left().len(),
        only_right = delta.only_right().len(),
        common = delta.common().len(),
        "computed delta"
    );

    let path_changes = if options.detect_path_changes {
        detect_path_changes(&delta)
    } else {
        Vec::new()
    };

    build_report(
        &delta,
        &path_changes,
        &ReportOptions {
            include_presence: options.include_presence,
            left_label: options.left_label.clone(),
            right_label: options.right_label.clone(),
        },
    )
}

/// Normalize a raw adapter tree, then inject presence from `required`.
pub fn canonicalize(raw: &RawNode, required: &RequiredPathSet) -> Result<SchemaTree, SchemaError> {
    canonicalize_with(raw, required, &NormalizeOptions::default())
}

/// [`canonicalize`] with explicit normalization switches.
pub fn canonicalize_with(
    raw: &RawNode,
    required: &RequiredPathSet,
    options: &NormalizeOptions,
) -> Result<SchemaTree, SchemaError> {
    let tree = normalize_with(raw, options)?;
    Ok(inject_presence(&tree, required))
}
