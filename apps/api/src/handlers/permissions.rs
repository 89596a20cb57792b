use axum::Json;

use campusguard_domain::Permission;

use crate::dto::PermissionResponse;

/// Lists every known permission key with its owning module.
pub async fn list_permissions_handler() -> Json<Vec<PermissionResponse>> {
    Json(
        Permission::all()
            .iter()
            .copied()
            .map(PermissionResponse::from)
            .collect(),
    )
}
