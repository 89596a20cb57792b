use std::collections::HashMap;

use async_trait::async_trait;
use campusguard_core::{AccountId, AppError, AppResult, UserIdentity};
use campusguard_domain::{DefaultRole, Role, RoleId};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, RoleRepository, SeedOutcome, UserRoleAssignment,
    UserRoleRepository,
};

pub(crate) fn account(value: &str) -> AccountId {
    AccountId::new(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn identity(account_id: &str, subject: &str) -> UserIdentity {
    UserIdentity::new(subject, subject, None, account(account_id))
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<HashMap<(AccountId, RoleId), Role>>,
}

impl FakeRoleRepository {
    pub(crate) async fn with_defaults(account_id: &AccountId) -> Self {
        let repository = Self::default();
        {
            let mut roles = repository.roles.lock().await;
            for default_role in DefaultRole::all() {
                let role = Role::from_default(*default_role, account_id.clone(), Utc::now());
                roles.insert((account_id.clone(), role.role_id().clone()), role);
            }
        }
        repository
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_role(
        &self,
        account_id: &AccountId,
        role_id: &RoleId,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&(account_id.clone(), role_id.clone()))
            .cloned())
    }

    async fn list_roles(&self, account_id: &AccountId) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| role.account_id() == account_id)
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let name_taken = roles.values().any(|existing| {
            existing.account_id() == role.account_id()
                && existing.name().eq_ignore_ascii_case(role.name())
        });
        let key = (role.account_id().clone(), role.role_id().clone());
        if name_taken || roles.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn save_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let key = (role.account_id().clone(), role.role_id().clone());
        if !roles.contains_key(&key) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.role_id()
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn delete_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<()> {
        self.roles
            .lock()
            .await
            .remove(&(account_id.clone(), role_id.clone()))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn seed_roles(
        &self,
        account_id: &AccountId,
        roles: Vec<Role>,
    ) -> AppResult<SeedOutcome> {
        let mut stored = self.roles.lock().await;
        let mut outcome = SeedOutcome::default();
        for role in roles {
            let key = (account_id.clone(), role.role_id().clone());
            if stored.contains_key(&key) {
                outcome.skipped.push(key.1);
            } else {
                outcome.inserted.push(key.1.clone());
                stored.insert(key, role);
            }
        }
        Ok(outcome)
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRoleRepository {
    pub(crate) assignments: Mutex<HashMap<(AccountId, String), UserRoleAssignment>>,
}

impl FakeUserRoleRepository {
    pub(crate) async fn with_assignment(
        account_id: &AccountId,
        subject: &str,
        role_id: impl Into<RoleId>,
    ) -> Self {
        let repository = Self::default();
        repository
            .assign(UserRoleAssignment {
                account_id: account_id.clone(),
                subject: subject.to_owned(),
                role_id: role_id.into(),
                assigned_at: Utc::now(),
            })
            .await
            .unwrap_or_else(|_| unreachable!());
        repository
    }
}

#[async_trait]
impl UserRoleRepository for FakeUserRoleRepository {
    async fn find_assignment(
        &self,
        account_id: &AccountId,
        subject: &str,
    ) -> AppResult<Option<UserRoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .get(&(account_id.clone(), subject.to_owned()))
            .cloned())
    }

    async fn assign(&self, assignment: UserRoleAssignment) -> AppResult<()> {
        self.assignments.lock().await.insert(
            (assignment.account_id.clone(), assignment.subject.clone()),
            assignment,
        );
        Ok(())
    }

    async fn claim_first_assignment(&self, assignment: UserRoleAssignment) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        if assignments
            .keys()
            .any(|(account_id, _)| account_id == &assignment.account_id)
        {
            return Ok(false);
        }

        assignments.insert(
            (assignment.account_id.clone(), assignment.subject.clone()),
            assignment,
        );
        Ok(true)
    }

    async fn list_assignments(
        &self,
        account_id: &AccountId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let mut assignments: Vec<UserRoleAssignment> = self
            .assignments
            .lock()
            .await
            .values()
            .filter(|assignment| &assignment.account_id == account_id)
            .cloned()
            .collect();
        assignments.sort_by(|left, right| left.subject.cmp(&right.subject));
        Ok(assignments)
    }

    async fn remove_for_role(&self, account_id: &AccountId, role_id: &RoleId) -> AppResult<u64> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|_, assignment| {
            !(&assignment.account_id == account_id && &assignment.role_id == role_id)
        });
        Ok((before - assignments.len()) as u64)
    }
}
