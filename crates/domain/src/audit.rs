use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a custom role is created.
    SecurityRoleCreated,
    /// Emitted when a role is updated.
    SecurityRoleUpdated,
    /// Emitted when a custom role is deleted.
    SecurityRoleDeleted,
    /// Emitted when default roles are seeded into an account.
    SecurityRoleDefaultsSeeded,
    /// Emitted when a role is assigned to a subject.
    SecurityRoleAssigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleDeleted => "security.role.deleted",
            Self::SecurityRoleDefaultsSeeded => "security.role.defaults_seeded",
            Self::SecurityRoleAssigned => "security.role.assigned",
        }
    }
}
