//! Error types for the core schema model.

/// Contract violation detected while building or reading canonical schema data.
///
/// The core never repairs malformed input: these errors mean an adapter (or a
/// caller) produced data outside the canonical vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A type string is not a known tag or a well-formed `union(...)`.
    #[error("malformed type '{input}': {detail}")]
    MalformedType { input: String, detail: String },

    /// A schema tree violates the structural invariants (array arity,
    /// non-object root, empty observation set, ...).
    #[error("malformed schema tree at '{path}': {detail}")]
    MalformedTree { path: String, detail: String },

    /// A union was requested from an empty member list.
    #[error("cannot build a union from zero members")]
    EmptyUnion,
}

impl SchemaError {
    pub(crate) fn malformed_tree(path: impl ToString, detail: impl Into<String>) -> Self {
        let path = path.to_string();
        SchemaError::MalformedTree {
            path: if path.is_empty() { "<root>".to_string() } else { path },
            detail: detail.into(),
        }
    }
}
