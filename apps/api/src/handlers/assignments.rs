use axum::Json;
use axum::extract::{Extension, Path, State};

use campusguard_core::UserIdentity;
use campusguard_domain::RoleId;

use crate::dto::{AssignRoleRequest, RoleAssignmentResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_role_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleAssignmentResponse>>> {
    let assignments = state
        .user_role_service
        .list_assignments(&user)
        .await?
        .into_iter()
        .map(RoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<RoleAssignmentResponse>> {
    let role_id = RoleId::new(payload.role_id)?;
    let assignment = state
        .user_role_service
        .assign_role(&user, &subject, &role_id)
        .await?;

    Ok(Json(RoleAssignmentResponse::from(assignment)))
}
