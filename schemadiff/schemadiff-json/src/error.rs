//! Error types for the JSON adapters.

/// Errors produced while reading JSON samples or a JSON Schema document.
#[derive(Debug, thiserror::Error)]
pub enum JsonSourceError {
    /// The input is not valid JSON.
    #[error("malformed JSON at line {line}, column {column}: {source}")]
    Parse {
        line: usize,
        column: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The sample input holds no record at all.
    #[error("no JSON records found, expected an object, an array of objects or NDJSON")]
    NoRecords,

    /// A sample record is not a JSON object.
    #[error("record {index} is {found}, expected a JSON object")]
    NotAnObject { index: usize, found: &'static str },

    /// The JSON Schema document is structurally invalid.
    #[error("invalid JSON Schema at '{path}': {detail}")]
    InvalidSchema { path: String, detail: String },

    /// A `$ref` that does not point into this document.
    #[error("unresolved JSON Schema reference '{reference}'")]
    UnresolvedRef { reference: String },
}

impl From<serde_json::Error> for JsonSourceError {
    fn from(source: serde_json::Error) -> Self {
        JsonSourceError::Parse {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}
