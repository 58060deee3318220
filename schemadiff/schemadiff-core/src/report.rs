//! Final, serializable comparison report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ChangeClass, Delta, PathChange};

/// A common path whose base type differs (or, with presence disabled, whose
/// nullability alone differs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMismatch {
    pub path: String,
    pub old_type: String,
    pub new_type: String,
    pub old_base: String,
    pub new_base: String,
    pub nullability_changed: bool,
}

/// A common path with identical base type but different nullability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceIssue {
    pub path: String,
    pub old_type: String,
    pub new_type: String,
    pub old_nullable: bool,
    pub new_nullable: bool,
}

/// Counts per report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub only_in_left: usize,
    pub only_in_right: usize,
    pub common_fields: usize,
    pub type_mismatches: usize,
    pub presence_issues: usize,
    pub path_changes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Route pure nullability changes to [`Report::presence_issues`].
    pub include_presence: bool,
    pub left_label: String,
    pub right_label: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_presence: true,
            left_label: "left".to_string(),
            right_label: "right".to_string(),
        }
    }
}

/// Outcome of one comparison. Every list is sorted by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    left_label: String,
    right_label: String,
    only_in_left: Vec<String>,
    only_in_right: Vec<String>,
    common_fields: Vec<String>,
    type_mismatches: Vec<TypeMismatch>,
    presence_issues: Vec<PresenceIssue>,
    path_changes: Vec<PathChange>,
}

impl Report {
    pub fn left_label(&self) -> &str {
        &self.left_label
    }

    pub fn right_label(&self) -> &str {
        &self.right_label
    }

    /// Paths only on the left, excluding those claimed by a path change.
    pub fn only_in_left(&self) -> &[String] {
        &self.only_in_left
    }

    /// Paths only on the right, excluding those claimed by a path change.
    pub fn only_in_right(&self) -> &[String] {
        &self.only_in_right
    }

    /// Paths present on both sides, regardless of type agreement.
    pub fn common_fields(&self) -> &[String] {
        &self.common_fields
    }

    pub fn type_mismatches(&self) -> &[TypeMismatch] {
        &self.type_mismatches
    }

    pub fn presence_issues(&self) -> &[PresenceIssue] {
        &self.presence_issues
    }

    pub fn path_changes(&self) -> &[PathChange] {
        &self.path_changes
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            only_in_left: self.only_in_left.len(),
            only_in_right: self.only_in_right.len(),
            common_fields: self.common_fields.len(),
            type_mismatches: self.type_mismatches.len(),
            presence_issues: self.presence_issues.len(),
            path_changes: self.path_changes.len(),
        }
    }

    pub fn has_differences(&self) -> bool {
        !(self.only_in_left.is_empty()
            && self.only_in_right.is_empty()
            && self.type_mismatches.is_empty()
            && self.presence_issues.is_empty()
            && self.path_changes.is_empty())
    }
}

/// Assemble the report from a delta and the path changes detected on it.
pub fn build_report(delta: &Delta, path_changes: &[PathChange], options: &ReportOptions) -> Report {
    let claimed_old: BTreeSet<&str> = path_changes
        .iter()
        .flat_map(|c| c.old_paths.iter().map(String::as_str))
        .collect();
    let claimed_new: BTreeSet<&str> = path_changes
        .iter()
        .flat_map(|c| c.new_paths.iter().map(String::as_str))
        .collect();

    let only_in_left = sorted(
        delta
            .only_left()
            .keys()
            .map(ToString::to_string)
            .filter(|p| !claimed_old.contains(p.as_str())),
    );
    let only_in_right = sorted(
        delta
            .only_right()
            .keys()
            .map(ToString::to_string)
            .filter(|p| !claimed_new.contains(p.as_str())),
    );
    let common_fields = sorted(delta.common().keys().map(ToString::to_string));

    let mut type_mismatches = Vec::new();
    let mut presence_issues = Vec::new();
    for (path, change) in delta.changed() {
        let class = ChangeClass::new(&change.old, &change.new);
        if class.is_presence_issue() && options.include_presence {
            presence_issues.push(PresenceIssue {
                path: path.to_string(),
                old_type: change.old.to_string(),
                new_type: change.new.to_string(),
                old_nullable: class.old_nullable,
                new_nullable: class.new_nullable,
            });
        } else {
            type_mismatches.push(TypeMismatch {
                path: path.to_string(),
                old_type: change.old.to_string(),
                new_type: change.new.to_string(),
                old_base: class.old_base.to_string(),
                new_base: class.new_base.to_string(),
                nullability_changed: class.has_nullability_change,
            });
        }
    }
    type_mismatches.sort_by(|a, b| a.path.cmp(&b.path));
    presence_issues.sort_by(|a, b| a.path.cmp(&b.path));

    Report {
        left_label: options.left_label.clone(),
        right_label: options.right_label.clone(),
        only_in_left,
        only_in_right,
        common_fields,
        type_mismatches,
        presence_issues,
        path_changes: path_changes.to_vec(),
    }
}

fn sorted(paths: impl Iterator<Item = String>) -> Vec<String> {
    let mut paths: Vec<String> = paths.collect();
    paths.sort();
    paths
}
