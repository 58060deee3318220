//! JSON adapters for the schemadiff pipeline.
//!
//! - [`json_samples_to_schema`] infers a schema from sample records (a JSON
//!   object, an array of objects, or NDJSON).
//! - [`json_schema_to_schema`] reads a JSON Schema document.
//!
//! Both return a [`RawSchema`](schemadiff_core::RawSchema) ready for
//! canonicalization.

mod error;
mod json_schema;
mod samples;

pub use error::JsonSourceError;
pub use json_schema::json_schema_to_schema;
pub use samples::{SampleOptions, json_samples_to_schema, read_records};
