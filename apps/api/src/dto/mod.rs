mod auth;
mod common;
mod roles;

pub use auth::{BootstrapRequest, SessionResponse};
pub use common::{HealthResponse, PermissionResponse};
pub use roles::{
    AssignRoleRequest, CreateRoleRequest, ListRolesQuery, PermissionContextResponse,
    RoleAssignmentResponse, RoleResponse, SeedOutcomeResponse, UpdateRoleRequest,
};

#[cfg(test)]
mod tests {
    use super::{
        AssignRoleRequest, BootstrapRequest, CreateRoleRequest, HealthResponse,
        PermissionContextResponse, PermissionResponse, RoleAssignmentResponse, RoleResponse,
        SeedOutcomeResponse, SessionResponse, UpdateRoleRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        BootstrapRequest::export(&config)?;
        SessionResponse::export(&config)?;
        HealthResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        AssignRoleRequest::export(&config)?;
        RoleResponse::export(&config)?;
        RoleAssignmentResponse::export(&config)?;
        SeedOutcomeResponse::export(&config)?;
        PermissionContextResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        let generated = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../packages/api-types/src/generated");
        for file_name in [
            "bootstrap-request.ts",
            "session-response.ts",
            "health-response.ts",
            "permission-response.ts",
            "create-role-request.ts",
            "update-role-request.ts",
            "assign-role-request.ts",
            "role-response.ts",
            "role-assignment-response.ts",
            "seed-outcome-response.ts",
            "permission-context-response.ts",
            "error-response.ts",
        ] {
            assert!(
                generated.join(file_name).is_file(),
                "{file_name} was not exported into the workspace packages directory"
            );
        }

        Ok(())
    }
}
