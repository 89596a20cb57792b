use std::sync::Arc;

use campusguard_core::{AccountId, AppError, AppResult, UserIdentity};
use campusguard_domain::{Permission, PermissionContext};
use chrono::Utc;
use tracing::warn;

use crate::{RoleRepository, UserRoleRepository};


/// Application service for account-scoped authorization checks.
///
/// Every check re-reads the subject's assignment and role from storage, so a
/// permission context cached on a session is never trusted for mutations.
#[derive(Clone)]
pub struct AuthorizationService {
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
    ) -> Self {
        Self {
            role_repository,
            user_role_repository,
        }
    }

    /// Resolves the effective permission context of an identity.
    ///
    /// Subjects without an assignment, or whose role has been removed, resolve
    /// to a context that grants nothing.
    pub async fn resolve_context(&self, identity: &UserIdentity) -> AppResult<PermissionContext> {
        self.resolve_subject(identity.account_id(), identity.subject())
            .await
    }

    /// Resolves the effective permission context of a subject in an account.
    pub async fn resolve_subject(
        &self,
        account_id: &AccountId,
        subject: &str,
    ) -> AppResult<PermissionContext> {
        let now = Utc::now();
        let Some(assignment) = self
            .user_role_repository
            .find_assignment(account_id, subject)
            .await?
        else {
            return Ok(PermissionContext::denied(subject, account_id.clone(), now));
        };

        let Some(role) = self
            .role_repository
            .find_role(account_id, &assignment.role_id)
            .await?
        else {
            return Ok(PermissionContext::denied(subject, account_id.clone(), now));
        };

        Ok(PermissionContext::new(
            subject,
            account_id.clone(),
            Some(assignment.role_id),
            role.permissions().clone(),
            now,
        ))
    }

    /// Ensures a subject has the required permission in its account.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission: Permission,
    ) -> AppResult<()> {
        let context = self.resolve_context(actor).await?;
        context.require(permission).inspect_err(|_| {
            warn!(
                subject = actor.subject(),
                account_id = %actor.account_id(),
                permission = permission.as_str(),
                "permission check denied"
            );
        })
    }

    /// Ensures a subject has at least one of the listed permissions.
    pub async fn require_any_permission(
        &self,
        actor: &UserIdentity,
        permissions: &[Permission],
    ) -> AppResult<()> {
        let context = self.resolve_context(actor).await?;
        if context.any(permissions) {
            return Ok(());
        }

        let keys = permissions
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>()
            .join("', '");
        warn!(
            subject = actor.subject(),
            account_id = %actor.account_id(),
            permissions = %keys,
            "permission check denied"
        );

        Err(AppError::PermissionDenied(format!(
            "subject '{}' is missing all of permissions ['{keys}'] in account '{}'",
            actor.subject(),
            actor.account_id()
        )))
    }

    /// Returns whether the subject currently has the permission.
    pub async fn has_permission(
        &self,
        actor: &UserIdentity,
        permission: Permission,
    ) -> AppResult<bool> {
        Ok(self.resolve_context(actor).await?.has(permission))
    }
}
