//! Protobuf adapter for the schemadiff pipeline.
//!
//! [`protobuf_descriptor_to_schema`] derives a raw schema from a serialized
//! `google.protobuf.FileDescriptorSet`. Field presence follows a
//! [`PresencePolicy`].

mod error;
mod policy;
mod schema;

pub use error::ProtobufSchemaError;
pub use policy::PresencePolicy;
pub use schema::{protobuf_descriptor_to_schema, protobuf_descriptor_to_schema_with_policy};
