use std::collections::HashMap;

use async_trait::async_trait;
use campusguard_application::{UserRoleAssignment, UserRoleRepository};
use campusguard_core::{AccountId, AppResult};
use campusguard_domain::RoleId;
use tokio::sync::RwLock;

/// In-memory subject role assignment repository.
#[derive(Debug, Default)]
pub struct InMemoryUserRoleRepository {
    assignments: RwLock<HashMap<(AccountId, String), UserRoleAssignment>>,
}

impl InMemoryUserRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRoleRepository for InMemoryUserRoleRepository {
    async fn find_assignment(
        &self,
        account_id: &AccountId,
        subject: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(&(account_id.clone(), subject.to_owned()))
            .cloned())
    }

    async fn assign(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        let key = (assignment.account_id.clone(), assignment.subject.clone());
        self.assignments.write().await.insert(key, assignment);
        Ok(())
    }

    async fn claim_first_assignment(&self, assignment: UserRoleAssignment) -> AppResult<bool> {
        let mut assignments = self.assignments.write().await;
        let account_has_holders = assignments
            .keys()
            .any(|(stored_account_id, _)| stored_account_id == &assignment.account_id);
        if account_has_holders {
            return Ok(false);
        }

        let key = (assignment.account_id.clone(), assignment.subject.clone());
        assignments.insert(key, assignment);
        Ok(true)
    }

    async fn list_assignments(
        &self,
        account_id: &AccountId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let assignments = self.assignments.read().await;

        let mut values: Vec<UserRoleAssignment> = assignments
            .iter()
            .filter_map(|((stored_account_id, _), assignment)| {
                (stored_account_id == account_id).then_some(assignment.clone())
            })
            .collect();
        values.sort_by(|left, right| left.subject.cmp(&right.subject));

        Ok(values)
    }

    async fn remove_for_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<u64> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|(stored_account_id, _), assignment| {
            !(stored_account_id == account_id && &assignment.role_id == role_id)
        });

        Ok(u64::try_from(before - assignments.len()).unwrap_or(u64::MAX))
    }
}
