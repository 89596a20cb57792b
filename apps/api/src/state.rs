use campusguard_application::{RoleService, UserRoleService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_service: RoleService,
    pub user_role_service: UserRoleService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
