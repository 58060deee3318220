//! Convert a protobuf `FileDescriptorSet` into a [`RawSchema`].

use prost_reflect::{DescriptorPool, FieldDescriptor, Kind, MessageDescriptor};
use schemadiff_core::{RawNode, RawSchema, RequiredPathSet, Tag};
use tracing::debug;

use crate::{PresencePolicy, ProtobufSchemaError};

const TIMESTAMP_MESSAGE: &str = "google.protobuf.Timestamp";
const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

/// Derive a raw schema from the given protobuf `FileDescriptorSet` bytes,
/// with [`PresencePolicy::PresenceAware`].
///
/// `message` is the fully-qualified message name (e.g. `"shop.v1.Order"`).
/// It may be omitted when the set defines a single top-level message outside
/// `google.protobuf`.
pub fn protobuf_descriptor_to_schema(
    schema_data: &[u8],
    message: Option<&str>,
) -> Result<RawSchema, ProtobufSchemaError> {
    protobuf_descriptor_to_schema_with_policy(schema_data, message, PresencePolicy::PresenceAware)
}

/// Derive a raw schema with a presence policy.
pub fn protobuf_descriptor_to_schema_with_policy(
    schema_data: &[u8],
    message: Option<&str>,
    policy: PresencePolicy,
) -> Result<RawSchema, ProtobufSchemaError> {
    let pool = DescriptorPool::decode(schema_data)?;
    let desc = select_message(&pool, message)?;
    debug!(message = desc.full_name(), ?policy, "deriving protobuf schema");

    let mut walker = Walker {
        policy,
        required: RequiredPathSet::new(),
        visiting: vec![desc.full_name().to_string()],
    };
    let tree = walker.message_fields(&desc, "");
    Ok(RawSchema::new(tree, walker.required, desc.full_name()))
}

fn select_message(
    pool: &DescriptorPool,
    message: Option<&str>,
) -> Result<MessageDescriptor, ProtobufSchemaError> {
    if let Some(name) = message {
        let name = name.trim_start_matches('.');
        return pool
            .get_message_by_name(name)
            .ok_or_else(|| ProtobufSchemaError::MessageNotFound {
                name: name.to_string(),
            });
    }

    let mut candidates: Vec<MessageDescriptor> = pool
        .all_messages()
        .filter(|m| m.parent_message().is_none() && !m.is_map_entry())
        .filter(|m| m.package_name() != WELL_KNOWN_PACKAGE)
        .collect();
    match candidates.len() {
        0 => Err(ProtobufSchemaError::NoMessages),
        1 => Ok(candidates.remove(0)),
        _ => Err(ProtobufSchemaError::AmbiguousMessage {
            candidates: candidates
                .iter()
                .map(|m| m.full_name().to_string())
                .collect(),
        }),
    }
}

struct Walker {
    policy: PresencePolicy,
    required: RequiredPathSet,
    /// Full names of the messages being expanded, outermost first.
    visiting: Vec<String>,
}

impl Walker {
    fn message_fields(&mut self, desc: &MessageDescriptor, prefix: &str) -> RawNode {
        let fields: Vec<(String, RawNode)> = desc
            .fields()
            .map(|fd| {
                let path = if prefix.is_empty() {
                    fd.name().to_string()
                } else {
                    format!("{prefix}.{}", fd.name())
                };
                if self.policy.is_required(fd.supports_presence()) {
                    self.required.insert(path.clone());
                }
                (fd.name().to_string(), self.field(&fd, &path))
            })
            .collect();
        RawNode::object(fields)
    }

    fn field(&mut self, fd: &FieldDescriptor, path: &str) -> RawNode {
        if fd.is_map() {
            RawNode::tag(Tag::Object)
        } else if fd.is_list() {
            // Element paths share the list's dotted path.
            RawNode::List(vec![self.kind(fd.kind(), path)])
        } else {
            self.kind(fd.kind(), path)
        }
    }

    fn kind(&mut self, kind: Kind, path: &str) -> RawNode {
        match kind {
            Kind::Double | Kind::Float => RawNode::tag(Tag::Float),
            Kind::Int32
            | Kind::Sint32
            | Kind::Sfixed32
            | Kind::Int64
            | Kind::Sint64
            | Kind::Sfixed64
            | Kind::Uint32
            | Kind::Fixed32
            | Kind::Uint64
            | Kind::Fixed64 => RawNode::tag(Tag::Int),
            Kind::Bool => RawNode::tag(Tag::Bool),
            Kind::String | Kind::Bytes | Kind::Enum(_) => RawNode::tag(Tag::Str),
            Kind::Message(msg) if msg.full_name() == TIMESTAMP_MESSAGE => {
                RawNode::tag(Tag::Timestamp)
            }
            Kind::Message(msg) if self.visiting.iter().any(|n| n == msg.full_name()) => {
                debug!(message = msg.full_name(), path, "recursive message folded to object");
                RawNode::tag(Tag::Object)
            }
            Kind::Message(msg) => {
                self.visiting.push(msg.full_name().to_string());
                let node = self.message_fields(&msg, path);
                self.visiting.pop();
                node
            }
        }
    }
}
