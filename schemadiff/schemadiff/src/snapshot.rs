//! Snapshot files: a canonical tree frozen to JSON for later comparison.
//!
//! ```json
//! { "version": 1, "label": "orders", "tree": { "id": { "scalar": "int" } } }
//! ```

use std::{fs, path::Path};

use schemadiff_core::SchemaTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{LoadedSource, SnapshotError, SourceError, loader::read_text};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    label: String,
    tree: SchemaTree,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

/// Write `source` as a snapshot file.
pub fn write_snapshot(path: &Path, source: &LoadedSource) -> Result<(), SourceError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        label: source.label.clone(),
        tree: source.tree.clone(),
    };
    let mut text = serde_json::to_string_pretty(&snapshot).map_err(|e| SourceError::Snapshot {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    text.push('\n');

    fs::write(path, text).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), label = %source.label, "wrote snapshot");
    Ok(())
}

/// Read a snapshot file. Snapshots of another format version are rejected.
pub fn read_snapshot(path: &Path) -> Result<LoadedSource, SourceError> {
    let text = read_text(path)?;
    let invalid = |source: SnapshotError| SourceError::Snapshot {
        path: path.to_path_buf(),
        source,
    };

    // The version is checked before the tree so newer layouts fail clearly.
    let header: SnapshotHeader = serde_json::from_str(&text).map_err(|e| invalid(e.into()))?;
    if header.version != SNAPSHOT_VERSION {
        return Err(invalid(SnapshotError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        }));
    }

    let snapshot: Snapshot = serde_json::from_str(&text).map_err(|e| invalid(e.into()))?;
    Ok(LoadedSource {
        tree: snapshot.tree,
        label: snapshot.label,
    })
}
