use campusguard_core::{AccountId, AppError, AppResult, UserIdentity};
use campusguard_domain::{AuditAction, Role, RoleId, RolePatch};
use chrono::Utc;
use tracing::{info, warn};

use crate::CreateRoleInput;

use super::RoleService;

impl RoleService {
    /// Returns one role of the actor's account.
    pub async fn get_role(&self, actor: &UserIdentity, role_id: &RoleId) -> AppResult<Role> {
        self.require_role_view_permission(actor).await?;
        self.find_existing_role(actor, role_id).await
    }

    /// Returns roles of an account ordered by name.
    ///
    /// Actors may only list roles of their own account.
    pub async fn list_roles(
        &self,
        actor: &UserIdentity,
        account_id: &AccountId,
    ) -> AppResult<Vec<Role>> {
        self.require_role_view_permission(actor).await?;

        if actor.account_id() != account_id {
            warn!(
                subject = actor.subject(),
                account_id = %actor.account_id(),
                requested_account_id = %account_id,
                "cross-account role listing denied"
            );
            return Err(AppError::PermissionDenied(format!(
                "subject '{}' cannot list roles of account '{account_id}'",
                actor.subject()
            )));
        }

        self.role_repository.list_roles(account_id).await
    }

    /// Creates a role in the actor's account and emits an audit event.
    pub async fn create_role(&self, actor: &UserIdentity, input: CreateRoleInput) -> AppResult<Role> {
        self.require_role_manage_permission(actor).await?;

        let role = Role::new(
            RoleId::generate(),
            actor.account_id().clone(),
            input.name,
            input.description,
            input.permissions,
            input.is_system,
            Utc::now(),
        )?;
        self.role_repository.insert_role(role.clone()).await?;

        info!(
            account_id = %role.account_id(),
            role_id = %role.role_id(),
            is_system = role.is_system(),
            "role created"
        );
        self.append_role_event(
            actor,
            AuditAction::SecurityRoleCreated,
            &role,
            format!("created role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Applies a partial update to a role and emits an audit event.
    ///
    /// Permission changes on system roles are rejected and leave the stored
    /// role untouched.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        patch: RolePatch,
    ) -> AppResult<Role> {
        self.require_role_manage_permission(actor).await?;

        let mut role = self.find_existing_role(actor, role_id).await?;
        let touches_permissions = patch.touches_permissions();
        role.apply_patch(patch, Utc::now()).inspect_err(|error| {
            if matches!(error, AppError::PermissionDenied(_)) {
                warn!(
                    subject = actor.subject(),
                    role_id = %role_id,
                    "system role permission update denied"
                );
            }
        })?;
        self.role_repository.save_role(role.clone()).await?;

        info!(
            account_id = %role.account_id(),
            role_id = %role.role_id(),
            touches_permissions,
            "role updated"
        );
        self.append_role_event(
            actor,
            AuditAction::SecurityRoleUpdated,
            &role,
            format!("updated role '{}'", role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a custom role, drops its assignments and emits an audit event.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: &RoleId) -> AppResult<()> {
        self.require_role_manage_permission(actor).await?;

        let role = self.find_existing_role(actor, role_id).await?;
        role.ensure_deletable().inspect_err(|_| {
            warn!(
                subject = actor.subject(),
                role_id = %role_id,
                "system role deletion denied"
            );
        })?;

        // Assignments go first so the count is not lost to a storage cascade.
        let released = self
            .user_role_repository
            .remove_for_role(role.account_id(), role.role_id())
            .await?;
        self.role_repository
            .delete_role(role.account_id(), role.role_id())
            .await?;

        info!(
            account_id = %role.account_id(),
            role_id = %role.role_id(),
            released_assignments = released,
            "role deleted"
        );
        self.append_role_event(
            actor,
            AuditAction::SecurityRoleDeleted,
            &role,
            format!(
                "deleted role '{}' and released {released} assignment(s)",
                role.name()
            ),
        )
        .await
    }

    async fn find_existing_role(&self, actor: &UserIdentity, role_id: &RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(actor.account_id(), role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{role_id}' does not exist in account '{}'",
                    actor.account_id()
                ))
            })
    }
}
