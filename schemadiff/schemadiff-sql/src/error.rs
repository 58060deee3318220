//! Error types for the SQL and dbt adapters.

/// Errors produced while reading DDL, a dbt manifest or a dbt `schema.yml`.
#[derive(Debug, thiserror::Error)]
pub enum SqlSourceError {
    /// The DDL holds no `CREATE TABLE` statement.
    #[error("no CREATE TABLE statement found")]
    NoTables,

    /// Several tables are defined and none was selected.
    #[error("several tables defined ({}), select one", .candidates.join(", "))]
    AmbiguousTable { candidates: Vec<String> },

    /// The selected table is not defined.
    #[error("table '{table}' not found (defined: {})", .candidates.join(", "))]
    TableNotFound {
        table: String,
        candidates: Vec<String>,
    },

    /// A `CREATE TABLE` statement could not be parsed.
    #[error("invalid CREATE TABLE statement for '{table}': {detail}")]
    InvalidStatement { table: String, detail: String },

    /// A column type expression could not be parsed.
    #[error("invalid SQL type '{input}': {detail}")]
    InvalidType { input: String, detail: String },

    /// The dbt manifest is not valid JSON or does not have the expected shape.
    #[error("invalid dbt manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The dbt `schema.yml` is not valid YAML or does not have the expected shape.
    #[error("invalid dbt schema.yml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The dbt document defines no model.
    #[error("no dbt model found")]
    NoModels,

    /// Several models are defined and none was selected.
    #[error("several dbt models defined ({}), select one", .candidates.join(", "))]
    AmbiguousModel { candidates: Vec<String> },

    /// The selected model is not defined.
    #[error("dbt model '{model}' not found (defined: {})", .candidates.join(", "))]
    ModelNotFound {
        model: String,
        candidates: Vec<String>,
    },
}
