use std::sync::Arc;

use campusguard_application::{
    AuditRepository, AuthorizationService, RoleRepository, RoleService, UserRoleRepository,
    UserRoleService,
};
use campusguard_infrastructure::{
    PostgresAuditRepository, PostgresRoleRepository, PostgresUserRoleRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    assemble_state(
        Arc::new(PostgresRoleRepository::new(pool.clone())),
        Arc::new(PostgresUserRoleRepository::new(pool.clone())),
        Arc::new(PostgresAuditRepository::new(pool)),
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
    )
}

#[cfg(test)]
pub fn build_in_memory_app_state(frontend_url: &str, bootstrap_token: &str) -> AppState {
    use campusguard_infrastructure::{
        InMemoryAuditRepository, InMemoryRoleRepository, InMemoryUserRoleRepository,
    };

    assemble_state(
        Arc::new(InMemoryRoleRepository::new()),
        Arc::new(InMemoryUserRoleRepository::new()),
        Arc::new(InMemoryAuditRepository::new()),
        frontend_url.to_owned(),
        bootstrap_token.to_owned(),
    )
}

fn assemble_state(
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    frontend_url: String,
    bootstrap_token: String,
) -> AppState {
    let authorization_service =
        AuthorizationService::new(role_repository.clone(), user_role_repository.clone());

    AppState {
        role_service: RoleService::new(
            authorization_service.clone(),
            role_repository.clone(),
            user_role_repository.clone(),
            audit_repository.clone(),
        ),
        user_role_service: UserRoleService::new(
            authorization_service,
            role_repository,
            user_role_repository,
            audit_repository,
        ),
        frontend_url,
        bootstrap_token,
    }
}
