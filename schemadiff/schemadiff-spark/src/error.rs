//! Error types for the Spark adapter.

/// Errors produced while reading a `printSchema()` dump. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SparkSchemaError {
    /// The dump does not start with the `root` header.
    #[error("line {line}: expected 'root' header, found '{found}'")]
    MissingRoot { line: usize, found: String },

    /// A field line could not be parsed.
    #[error("line {line}: {detail}")]
    InvalidLine { line: usize, detail: String },

    /// An `array` field without its `element` line.
    #[error("line {line}: array field '{name}' has no element line")]
    MissingElement { line: usize, name: String },
}
