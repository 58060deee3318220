use std::{fmt, path::Path, str::FromStr};

/// Source formats understood by [`load_source`](crate::load_source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// JSON sample records: one object, an array of objects, or NDJSON (`json`)
    Json,
    /// JSON Schema document (`json-schema`)
    JsonSchema,
    /// `CREATE TABLE` script (`sql`)
    Sql,
    /// Compiled dbt `manifest.json` (`dbt-manifest`)
    DbtManifest,
    /// dbt `schema.yml` (`dbt-yaml`)
    DbtYaml,
    /// Spark `printSchema()` dump (`spark`)
    Spark,
    /// Serialized protobuf `FileDescriptorSet` (`protobuf`)
    Protobuf,
    /// Canonical tree snapshot written by [`write_snapshot`](crate::write_snapshot) (`snapshot`)
    Snapshot,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 8] = [
        SourceFormat::Json,
        SourceFormat::JsonSchema,
        SourceFormat::Sql,
        SourceFormat::DbtManifest,
        SourceFormat::DbtYaml,
        SourceFormat::Spark,
        SourceFormat::Protobuf,
        SourceFormat::Snapshot,
    ];

    pub const NAMES: [&'static str; 8] = [
        "json",
        "json-schema",
        "sql",
        "dbt-manifest",
        "dbt-yaml",
        "spark",
        "protobuf",
        "snapshot",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonSchema => "json-schema",
            Self::Sql => "sql",
            Self::DbtManifest => "dbt-manifest",
            Self::DbtYaml => "dbt-yaml",
            Self::Spark => "spark",
            Self::Protobuf => "protobuf",
            Self::Snapshot => "snapshot",
        }
    }

    /// Guess the format from the file name.
    ///
    /// Compound suffixes win over the plain extension: `*.snapshot.json` and
    /// `*.schema.json` are not sample files, and a file named `manifest.json`
    /// is a dbt manifest.
    pub fn infer(path: &Path) -> Option<SourceFormat> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name == "manifest.json" {
            return Some(Self::DbtManifest);
        }
        if name.ends_with(".snapshot.json") {
            return Some(Self::Snapshot);
        }
        if name.ends_with(".schema.json") {
            return Some(Self::JsonSchema);
        }

        let (_, extension) = name.rsplit_once('.')?;
        match extension {
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            "sql" | "ddl" => Some(Self::Sql),
            "yml" | "yaml" => Some(Self::DbtYaml),
            "txt" | "spark" => Some(Self::Spark),
            "pb" | "desc" | "binpb" => Some(Self::Protobuf),
            _ => None,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown source format '{s}', expected one of: {}",
                    Self::NAMES.join(", ")
                )
            })
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
