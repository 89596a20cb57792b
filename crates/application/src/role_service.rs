use std::sync::Arc;

use campusguard_core::{AppResult, UserIdentity};
use campusguard_domain::{AuditAction, Permission, Role};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, RoleRepository, UserRoleRepository,
};

mod crud;
mod seeding;


const ROLE_RESOURCE_TYPE: &str = "rbac_role";

/// Application service for account role administration.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleService {
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

    async fn require_role_view_permission(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_any_permission(
                actor,
                &[Permission::AdminRolesView, Permission::AdminRolesManage],
            )
            .await
    }

    async fn require_role_manage_permission(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor, Permission::AdminRolesManage)
            .await
    }

    async fn append_role_event(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        role: &Role,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                account_id: actor.account_id().clone(),
                subject: actor.subject().to_owned(),
                action,
                resource_type: ROLE_RESOURCE_TYPE.to_owned(),
                resource_id: role.role_id().to_string(),
                detail: Some(detail),
            })
            .await
    }
}
