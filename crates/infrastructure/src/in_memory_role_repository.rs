use std::collections::HashMap;

use async_trait::async_trait;
use campusguard_application::{RoleRepository, SeedOutcome};
use campusguard_core::{AccountId, AppError, AppResult};
use campusguard_domain::{Role, RoleId};
use tokio::sync::RwLock;
use tracing::warn;


/// In-memory role repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<HashMap<(AccountId, RoleId), Role>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }
}

fn name_taken(
    roles: &HashMap<(AccountId, RoleId), Role>,
    account_id: &AccountId,
    role_id: &RoleId,
    name: &str,
) -> bool {
    let lowered = name.to_lowercase();
    roles.iter().any(|((stored_account_id, stored_role_id), role)| {
        stored_account_id == account_id
            && stored_role_id != role_id
            && role.name().to_lowercase() == lowered
    })
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_role(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .get(&(account_id.clone(), role_id.clone()))
            .cloned())
    }

    async fn list_roles(&self, account_id: &AccountId) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        let mut values: Vec<Role> = roles
            .iter()
            .filter_map(|((stored_account_id, _), role)| {
                (stored_account_id == account_id).then_some(role.clone())
            })
            .collect();
        values.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(values)
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let key = (role.account_id().clone(), role.role_id().clone());
        let mut roles = self.roles.write().await;

        if roles.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists for account '{}'",
                key.1, key.0
            )));
        }

        if name_taken(&roles, &key.0, &key.1, role.name()) {
            return Err(AppError::Conflict(format!(
                "role name '{}' already exists for account '{}'",
                role.name(),
                key.0
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        let key = (role.account_id().clone(), role.role_id().clone());
        let mut roles = self.roles.write().await;

        if !roles.contains_key(&key) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist for account '{}'",
                key.1, key.0
            )));
        }

        if name_taken(&roles, &key.0, &key.1, role.name()) {
            return Err(AppError::Conflict(format!(
                "role name '{}' already exists for account '{}'",
                role.name(),
                key.0
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn delete_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<()> {
        self.roles
            .write()
            .await
            .remove(&(account_id.clone(), role_id.clone()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{role_id}' does not exist for account '{account_id}'"
                ))
            })
    }

    async fn seed_roles(
        &self,
        account_id: &AccountId,
        seeded_roles: Vec<Role>,
    ) -> AppResult<SeedOutcome> {
        let mut roles = self.roles.write().await;
        let mut outcome = SeedOutcome::default();

        for role in seeded_roles {
            if role.account_id() != account_id {
                return Err(AppError::Internal(format!(
                    "seeded role '{}' belongs to account '{}' instead of '{account_id}'",
                    role.role_id(),
                    role.account_id()
                )));
            }

            let key = (account_id.clone(), role.role_id().clone());
            if roles.contains_key(&key) {
                outcome.skipped.push(key.1);
                continue;
            }
            if name_taken(&roles, &key.0, &key.1, role.name()) {
                warn!(
                    account_id = %account_id,
                    role_id = %key.1,
                    name = role.name(),
                    "seeded role skipped: name already used by another role"
                );
                outcome.skipped.push(key.1);
                continue;
            }

            outcome.inserted.push(key.1.clone());
            roles.insert(key, role);
        }

        Ok(outcome)
    }
}
