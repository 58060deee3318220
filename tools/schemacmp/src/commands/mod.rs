pub mod batch;
pub mod diff;
pub mod schema;
