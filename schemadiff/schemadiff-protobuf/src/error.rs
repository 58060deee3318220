//! Error types for the protobuf adapter.

/// Errors produced while deriving a schema from a `FileDescriptorSet`.
#[derive(Debug, thiserror::Error)]
pub enum ProtobufSchemaError {
    /// The bytes are not a valid serialized `FileDescriptorSet`.
    #[error("failed to decode FileDescriptorSet: {0}")]
    Decode(#[from] prost_reflect::DescriptorError),

    /// The requested message is not defined.
    #[error("message '{name}' not found in descriptor set")]
    MessageNotFound { name: String },

    /// No message was requested and the set defines several.
    #[error("several messages defined ({}), select one", .candidates.join(", "))]
    AmbiguousMessage { candidates: Vec<String> },

    /// The set defines no message at all.
    #[error("descriptor set defines no message")]
    NoMessages,
}
