//! Reclassification of add/remove pairs as field relocations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CanonicalType, Delta, FieldPath};

/// A field that probably moved: same leaf name and same base type on both
/// sides, at different paths.
///
/// When several candidates share the name and type, they are all listed in
/// one entry rather than paired arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChange {
    pub name: String,
    pub old_paths: Vec<String>,
    pub new_paths: Vec<String>,
}

#[derive(Default)]
struct Candidates {
    old: Vec<String>,
    new: Vec<String>,
}

/// Match only-in-left paths against only-in-right paths by leaf name and base
/// type (nullability ignored).
///
/// Best effort: renames that change the leaf name are not detected.
pub fn detect_path_changes(delta: &Delta) -> Vec<PathChange> {
    let mut groups: BTreeMap<(String, CanonicalType), Candidates> = BTreeMap::new();

    for (path, ty) in delta.only_left() {
        if let Some(key) = group_key(path, ty) {
            groups.entry(key).or_default().old.push(path.to_string());
        }
    }
    for (path, ty) in delta.only_right() {
        if let Some(key) = group_key(path, ty) {
            groups.entry(key).or_default().new.push(path.to_string());
        }
    }

    let mut changes: Vec<PathChange> = groups
        .into_iter()
        .filter(|(_, c)| !c.old.is_empty() && !c.new.is_empty())
        .map(|((name, _), mut c)| {
            c.old.sort();
            c.new.sort();
            PathChange {
                name,
                old_paths: c.old,
                new_paths: c.new,
            }
        })
        .collect();
    changes.sort_by(|a, b| (&a.name, &a.old_paths).cmp(&(&b.name, &b.old_paths)));

    debug!(path_changes = changes.len(), "detected path changes");
    changes
}

fn group_key(path: &FieldPath, ty: &CanonicalType) -> Option<(String, CanonicalType)> {
    let name = path.leaf_name()?;
    let (base, _) = ty.split_nullability();
    Some((name.to_string(), base))
}
