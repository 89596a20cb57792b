use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use campusguard_application::CreateRoleInput;
use campusguard_core::{AccountId, UserIdentity};
use campusguard_domain::{PermissionMap, RoleId, RolePatch};

use crate::dto::{
    CreateRoleRequest, ListRolesQuery, RoleResponse, SeedOutcomeResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<ListRolesQuery>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let account_id = match query.account_id {
        Some(account_id) => AccountId::new(account_id)?,
        None => user.account_id().clone(),
    };

    let roles = state
        .role_service
        .list_roles(&user, &account_id)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::new(role_id)?;
    let role = state.role_service.get_role(&user, &role_id).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let permissions = PermissionMap::from_json_object(&payload.permissions)?;

    let role = state
        .role_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                description: payload.description,
                permissions,
                is_system: payload.is_system,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = RoleId::new(role_id)?;
    let permissions = payload
        .permissions
        .as_ref()
        .map(PermissionMap::from_json_object)
        .transpose()?;

    let role = state
        .role_service
        .update_role(
            &user,
            &role_id,
            RolePatch {
                name: payload.name,
                description: payload.description,
                permissions,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    let role_id = RoleId::new(role_id)?;
    state.role_service.delete_role(&user, &role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reseed_default_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<SeedOutcomeResponse>> {
    let outcome = state.role_service.reseed_default_roles(&user).await?;

    Ok(Json(SeedOutcomeResponse::from(outcome)))
}
