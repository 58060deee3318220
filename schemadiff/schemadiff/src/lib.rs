mod error;
mod format;
mod loader;
mod snapshot;

pub use error::{AdapterError, SnapshotError, SourceError};
pub use format::SourceFormat;
pub use loader::{LoadOptions, LoadedSource, SourceSpec, compare_sources, load_source};
pub use schemadiff_core as core;
pub use schemadiff_json as json;
#[cfg(feature = "protobuf")]
pub use schemadiff_protobuf as protobuf;
pub use schemadiff_spark as spark;
pub use schemadiff_sql as sql;
pub use snapshot::{SNAPSHOT_VERSION, read_snapshot, write_snapshot};
