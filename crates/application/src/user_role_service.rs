use std::sync::Arc;

use campusguard_core::{AccountId, AppError, AppResult, UserIdentity};
use campusguard_domain::{
    AuditAction, DefaultRole, Permission, PermissionContext, RoleId, has_permission,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, RoleRepository, UserRoleAssignment,
    UserRoleRepository,
};


/// Application service for subject role assignments.
#[derive(Clone)]
pub struct UserRoleService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserRoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            user_role_repository,
            audit_repository,
        }
    }

    /// Assigns a role to a subject, replacing any previous role.
    ///
    /// Handing out a role that grants role management requires the actor to
    /// hold role management too.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        subject: &str,
        role_id: &RoleId,
    ) -> AppResult<UserRoleAssignment> {
        let actor_context = self.authorization_service.resolve_context(actor).await?;
        actor_context
            .require(Permission::AdminUsersManage)
            .inspect_err(|_| {
                warn!(
                    subject = actor.subject(),
                    account_id = %actor.account_id(),
                    "role assignment denied"
                );
            })?;

        let subject = normalize_subject(subject)?;
        let role = self
            .role_repository
            .find_role(actor.account_id(), role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{role_id}' does not exist in account '{}'",
                    actor.account_id()
                ))
            })?;

        let grants_role_management =
            has_permission(Some(role.permissions()), Permission::AdminRolesManage);
        if grants_role_management && !actor_context.has(Permission::AdminRolesManage) {
            warn!(
                subject = actor.subject(),
                role_id = %role_id,
                "escalating role assignment denied"
            );
            return Err(AppError::PermissionDenied(format!(
                "subject '{}' cannot assign role '{role_id}' because it grants '{}'",
                actor.subject(),
                Permission::AdminRolesManage.as_str()
            )));
        }

        let assignment = UserRoleAssignment {
            account_id: actor.account_id().clone(),
            subject: subject.clone(),
            role_id: role_id.clone(),
            assigned_at: Utc::now(),
        };
        self.user_role_repository.assign(assignment.clone()).await?;

        info!(
            account_id = %assignment.account_id,
            subject = %assignment.subject,
            role_id = %assignment.role_id,
            "role assigned"
        );
        self.audit_repository
            .append_event(AuditEvent {
                account_id: actor.account_id().clone(),
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityRoleAssigned,
                resource_type: "rbac_subject_role".to_owned(),
                resource_id: format!("{subject}:{role_id}"),
                detail: Some(format!("assigned role '{}' to '{subject}'", role.name())),
            })
            .await?;

        Ok(assignment)
    }

    /// Returns assignments of the actor's account ordered by subject.
    pub async fn list_assignments(&self, actor: &UserIdentity) -> AppResult<Vec<UserRoleAssignment>> {
        self.authorization_service
            .require_permission(actor, Permission::AdminUsersManage)
            .await?;

        self.user_role_repository
            .list_assignments(actor.account_id())
            .await
    }

    /// Returns the subject's role, assigning `fallback` to the first subject of
    /// an account.
    ///
    /// An existing assignment is kept. Once anyone in the account holds a role,
    /// a subject without one stays unassigned (`None`) and resolves to a
    /// context that grants nothing.
    pub async fn ensure_assignment(
        &self,
        account_id: &AccountId,
        subject: &str,
        fallback: DefaultRole,
    ) -> AppResult<Option<UserRoleAssignment>> {
        let subject = normalize_subject(subject)?;
        if let Some(existing) = self
            .user_role_repository
            .find_assignment(account_id, &subject)
            .await?
        {
            return Ok(Some(existing));
        }

        let role_id = RoleId::from(fallback);
        if self
            .role_repository
            .find_role(account_id, &role_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist in account '{account_id}'"
            )));
        }

        let assignment = UserRoleAssignment {
            account_id: account_id.clone(),
            subject: subject.clone(),
            role_id,
            assigned_at: Utc::now(),
        };
        let claimed = self
            .user_role_repository
            .claim_first_assignment(assignment.clone())
            .await?;
        if !claimed {
            info!(
                account_id = %account_id,
                subject = %subject,
                "subject holds no role in an already provisioned account"
            );
            return Ok(None);
        }

        info!(
            account_id = %account_id,
            subject = %subject,
            role_id = %assignment.role_id,
            "initial role assigned"
        );
        self.audit_repository
            .append_event(AuditEvent {
                account_id: account_id.clone(),
                subject: subject.clone(),
                action: AuditAction::SecurityRoleAssigned,
                resource_type: "rbac_subject_role".to_owned(),
                resource_id: format!("{subject}:{}", assignment.role_id),
                detail: Some(format!(
                    "provisioned '{subject}' with role '{}'",
                    assignment.role_id
                )),
            })
            .await?;

        Ok(Some(assignment))
    }

    /// Resolves the permission context cached on a session.
    pub async fn resolve_context(&self, identity: &UserIdentity) -> AppResult<PermissionContext> {
        self.authorization_service.resolve_context(identity).await
    }
}

fn normalize_subject(subject: &str) -> AppResult<String> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()));
    }

    Ok(trimmed.to_owned())
}
