//! Error types for source loading.

use std::path::PathBuf;

use schemadiff_core::SchemaError;
use schemadiff_json::JsonSourceError;
#[cfg(feature = "protobuf")]
use schemadiff_protobuf::ProtobufSchemaError;
use schemadiff_spark::SparkSchemaError;
use schemadiff_sql::SqlSourceError;

use crate::SourceFormat;

/// Errors produced by [`load_source`](crate::load_source) and the snapshot
/// functions. Every variant names the file involved.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be read or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No format was given and none could be inferred from the file name.
    #[error(
        "cannot infer the format of {}; pass one of: {}",
        path.display(),
        SourceFormat::NAMES.join(", ")
    )]
    UnknownFormat { path: PathBuf },

    /// The format is known but this build does not include its adapter.
    #[error("format '{format}' is not enabled in this build ({})", path.display())]
    FormatDisabled { path: PathBuf, format: SourceFormat },

    /// The adapter rejected the file contents.
    #[error("cannot read {} as {format}: {source}", path.display())]
    Adapter {
        path: PathBuf,
        format: SourceFormat,
        #[source]
        source: AdapterError,
    },

    /// The adapter output violates the canonical tree contract.
    #[error("invalid schema derived from {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    /// A snapshot file could not be read or written.
    #[error("invalid snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
}

/// Error reported by one of the format adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Json(#[from] JsonSourceError),

    #[error(transparent)]
    Sql(#[from] SqlSourceError),

    #[error(transparent)]
    Spark(#[from] SparkSchemaError),

    #[cfg(feature = "protobuf")]
    #[error(transparent)]
    Protobuf(#[from] ProtobufSchemaError),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
}
