//! SQL-flavoured adapters for the schemadiff pipeline.
//!
//! - [`ddl_to_schema`] reads `CREATE TABLE` statements.
//! - [`dbt_manifest_to_schema`] and [`dbt_yaml_to_schema`] read dbt model
//!   definitions from a compiled `manifest.json` or a `schema.yml`.
//! - [`parse_sql_type`] / [`map_sql_type`] expose the shared type mapping.

mod dbt;
mod ddl;
mod error;
mod types;

pub use dbt::{DbtOptions, dbt_manifest_to_schema, dbt_yaml_to_schema};
pub use ddl::{DdlOptions, ddl_to_schema};
pub use error::SqlSourceError;
pub use types::{SqlType, StructField, map_sql_type, parse_sql_type};
