/// Policy deciding which protobuf fields are certain to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresencePolicy {
    /// Every field is read through protobuf default semantics, so every field
    /// is present.
    AlwaysDefault,
    /// Presence-aware behavior (default):
    ///
    /// Fields that support presence (message fields, `optional` scalars,
    /// oneof members, proto2 fields) may be absent. Fields that do not
    /// support presence always read a value and are present.
    #[default]
    PresenceAware,
}

impl PresencePolicy {
    pub(crate) fn is_required(self, supports_presence: bool) -> bool {
        match self {
            PresencePolicy::AlwaysDefault => true,
            PresencePolicy::PresenceAware => !supports_presence,
        }
    }
}
