use async_trait::async_trait;
use campusguard_core::{AccountId, AppResult};
use campusguard_domain::{PermissionMap, Role, RoleId};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Display name, unique within the account.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Permission flags attached to the role.
    pub permissions: PermissionMap,
    /// Marks the role as immutable once created.
    pub is_system: bool,
}

/// Result of seeding the default role table into an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Roles written by this run.
    pub inserted: Vec<RoleId>,
    /// Roles left untouched because they already existed.
    pub skipped: Vec<RoleId>,
}

impl SeedOutcome {
    /// Returns whether the run wrote nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.inserted.is_empty()
    }
}

/// Repository port for account-scoped roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds one role by identifier.
    async fn find_role(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> AppResult<Option<Role>>;

    /// Lists every role of an account, ordered by name.
    async fn list_roles(&self, account_id: &AccountId) -> AppResult<Vec<Role>>;

    /// Inserts a new role. Fails with `Conflict` when the id or the
    /// case-insensitive name is already taken in the account.
    async fn insert_role(&self, role: Role) -> AppResult<()>;

    /// Replaces a stored role. Fails with `NotFound` when it does not exist.
    async fn save_role(&self, role: Role) -> AppResult<()>;

    /// Deletes a role. Fails with `NotFound` when it does not exist.
    async fn delete_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<()>;

    /// Inserts every role that is not already present, as one atomic batch.
    /// Existing roles are never overwritten.
    async fn seed_roles(
        &self,
        account_id: &AccountId,
        roles: Vec<Role>,
    ) -> AppResult<SeedOutcome>;
}
