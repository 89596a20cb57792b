use async_trait::async_trait;
use campusguard_core::{AccountId, AppResult};
use campusguard_domain::RoleId;
use chrono::{DateTime, Utc};

/// The single role held by a subject in an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Account scope.
    pub account_id: AccountId,
    /// Subject identifier.
    pub subject: String,
    /// Assigned role.
    pub role_id: RoleId,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Repository port for subject role assignments.
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Finds the assignment of one subject.
    async fn find_assignment(
        &self,
        account_id: &AccountId,
        subject: &str,
    ) -> AppResult<Option<UserRoleAssignment>>;

    /// Stores an assignment, replacing the subject's previous one.
    async fn assign(&self, assignment: UserRoleAssignment) -> AppResult<()>;

    /// Stores `assignment` only when its account has no assignment yet.
    ///
    /// The check and the insert are atomic. Returns whether the assignment
    /// was stored.
    async fn claim_first_assignment(&self, assignment: UserRoleAssignment) -> AppResult<bool>;

    /// Lists assignments of an account, ordered by subject.
    async fn list_assignments(
        &self,
        account_id: &AccountId,
    ) -> AppResult<Vec<UserRoleAssignment>>;

    /// Removes every assignment pointing at a role and returns how many were removed.
    async fn remove_for_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<u64>;
}
