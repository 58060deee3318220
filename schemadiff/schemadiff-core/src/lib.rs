//! Format-agnostic core of `schemadiff`.
//!
//! This crate holds the canonical type algebra ([`CanonicalType`]), the
//! canonical tree ([`SchemaTree`]) and every pure step between adapter output
//! and a [`Report`]:
//!
//! ```text
//! RawSchema (adapter output)
//!   └─ normalize          – unwrap list wrappers, fold observations
//!       └─ inject_presence – add `missing` to fields not certain to exist
//!           └─ filter_tree – optional restriction to dotted paths
//!               └─ diff_trees – Delta
//!                   └─ detect_path_changes + build_report – Report
//! ```
//!
//! Nothing here performs I/O; every function works on fully materialized trees.

mod compare;
mod diff;
mod error;
mod filter;
mod normalize;
mod path_change;
mod presence;
mod raw;
mod report;
mod schema;
mod types;

pub use compare::{CompareOptions, canonicalize, canonicalize_with, compare};
pub use diff::{Delta, TypeChange, diff_trees};
pub use error::SchemaError;
pub use filter::filter_tree;
pub use normalize::{
    ELEMENT_WRAPPER_KEY, LIST_WRAPPER_KEY, NormalizeOptions, normalize, normalize_with,
};
pub use path_change::{PathChange, detect_path_changes};
pub use presence::{RequiredPathSet, inject_presence};
pub use raw::{RawNode, RawSchema};
pub use report::{
    PresenceIssue, Report, ReportOptions, ReportSummary, TypeMismatch, build_report,
};
pub use schema::{FieldPath, PathSegment, SchemaNode, SchemaTree, format_schema_tree};
pub use types::{
    CanonicalType, ChangeClass, Tag, build_union, classify_change, is_union, split_nullability,
    union_parts,
};
