//! Canonical schema tree and structured field paths.

mod format;
mod path;
mod tree;

pub use format::format_schema_tree;
pub use path::{FieldPath, PathSegment};
pub use tree::{SchemaNode, SchemaTree};
