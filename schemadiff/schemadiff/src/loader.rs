//! Source loading: read a file, run its adapter, canonicalize.

use std::{
    fs,
    path::{Path, PathBuf},
};

use schemadiff_core::{CompareOptions, RawSchema, Report, SchemaTree, compare};
use schemadiff_json::{SampleOptions, json_samples_to_schema, json_schema_to_schema};
#[cfg(feature = "protobuf")]
use schemadiff_protobuf::{PresencePolicy, protobuf_descriptor_to_schema_with_policy};
use schemadiff_spark::spark_schema_to_schema;
use schemadiff_sql::{
    DbtOptions, DdlOptions, dbt_manifest_to_schema, dbt_yaml_to_schema, ddl_to_schema,
};
use tracing::{debug, info_span, warn};

use crate::{AdapterError, SourceError, SourceFormat, snapshot::read_snapshot};

/// Where a schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub path: PathBuf,
    /// Explicit format; inferred from the file name when `None`.
    pub format: Option<SourceFormat>,
    /// Table (SQL), model (dbt) or fully-qualified message (protobuf) to read
    /// from a file that defines several.
    pub target: Option<String>,
    /// Report label; defaults to the label derived by the adapter.
    pub label: Option<String>,
}

impl SourceSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            target: None,
            label: None,
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The explicit format, or the one inferred from the file name.
    pub fn resolve_format(&self) -> Result<SourceFormat, SourceError> {
        self.format
            .or_else(|| SourceFormat::infer(&self.path))
            .ok_or_else(|| SourceError::UnknownFormat {
                path: self.path.clone(),
            })
    }
}

/// Adapter settings shared by every source of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub json: SampleOptions,
    #[cfg(feature = "protobuf")]
    pub presence_policy: PresencePolicy,
}

/// A canonical, presence-injected tree and its report label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub tree: SchemaTree,
    pub label: String,
}

/// Load one source into its canonical tree.
pub fn load_source(spec: &SourceSpec, options: &LoadOptions) -> Result<LoadedSource, SourceError> {
    let format = spec.resolve_format()?;
    let _span = info_span!("load_source", path = %spec.path.display(), %format).entered();

    let mut loaded = load_tree(spec, format, options)?;
    if let Some(label) = &spec.label {
        loaded.label.clone_from(label);
    }
    debug!(label = %loaded.label, fields = loaded.tree.len(), "loaded source");
    Ok(loaded)
}

/// Load both sources and compare them, labelling the report with the source
/// labels.
pub fn compare_sources(
    left: &SourceSpec,
    right: &SourceSpec,
    load_options: &LoadOptions,
    compare_options: &CompareOptions,
) -> Result<Report, SourceError> {
    let left = load_source(left, load_options)?;
    let right = load_source(right, load_options)?;

    let options = CompareOptions {
        left_label: left.label,
        right_label: right.label,
        ..compare_options.clone()
    };
    Ok(compare(&left.tree, &right.tree, &options))
}

fn load_tree(
    spec: &SourceSpec,
    format: SourceFormat,
    options: &LoadOptions,
) -> Result<LoadedSource, SourceError> {
    let path = spec.path.as_path();
    let label = default_label(path);
    let target = spec.target.clone();
    if target.is_some()
        && matches!(
            format,
            SourceFormat::Json | SourceFormat::JsonSchema | SourceFormat::Spark | SourceFormat::Snapshot
        )
    {
        warn!(%format, "target ignored for a single-schema format");
    }

    let adapter_error = |source: AdapterError| SourceError::Adapter {
        path: path.to_path_buf(),
        format,
        source,
    };

    let raw = match format {
        SourceFormat::Json => json_samples_to_schema(&label, &read_text(path)?, &options.json)
            .map_err(AdapterError::from),
        SourceFormat::JsonSchema => {
            json_schema_to_schema(&label, &read_text(path)?).map_err(AdapterError::from)
        }
        SourceFormat::Sql => ddl_to_schema(&read_text(path)?, &DdlOptions { table: target })
            .map_err(AdapterError::from),
        SourceFormat::DbtManifest => {
            dbt_manifest_to_schema(&read_text(path)?, &DbtOptions { model: target })
                .map_err(AdapterError::from)
        }
        SourceFormat::DbtYaml => dbt_yaml_to_schema(&read_text(path)?, &DbtOptions { model: target })
            .map_err(AdapterError::from),
        SourceFormat::Spark => {
            spark_schema_to_schema(&label, &read_text(path)?).map_err(AdapterError::from)
        }
        #[cfg(feature = "protobuf")]
        SourceFormat::Protobuf => {
            let bytes = fs::read(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            protobuf_descriptor_to_schema_with_policy(
                &bytes,
                target.as_deref(),
                options.presence_policy,
            )
            .map_err(AdapterError::from)
        }
        #[cfg(not(feature = "protobuf"))]
        SourceFormat::Protobuf => {
            return Err(SourceError::FormatDisabled {
                path: path.to_path_buf(),
                format,
            });
        }
        SourceFormat::Snapshot => return read_snapshot(path),
    };
    let raw: RawSchema = raw.map_err(adapter_error)?;
    debug!(label = %raw.label, required = raw.required.len(), "adapter finished");

    let tree = raw.canonicalize().map_err(|source| SourceError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedSource {
        tree,
        label: raw.label,
    })
}

pub(crate) fn read_text(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// File name up to its first dot: `orders.schema.json` → `orders`.
fn default_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').find(|part| !part.is_empty()))
        .unwrap_or("schema")
        .to_string()
}
