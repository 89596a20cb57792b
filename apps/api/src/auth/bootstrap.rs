use axum::Json;
use axum::extract::State;
use campusguard_core::{AccountId, AppError, UserIdentity};
use campusguard_domain::DefaultRole;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::{BootstrapRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_USER_KEY, cache_context};

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if payload.token != state.bootstrap_token {
        warn!(subject = %payload.subject, "bootstrap rejected: invalid token");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let account_id = AccountId::new(payload.account_id)?;
    state
        .role_service
        .initialize_default_roles(&account_id)
        .await?;

    let subject = payload.subject.trim().to_owned();
    let assignment = state
        .user_role_service
        .ensure_assignment(&account_id, &subject, DefaultRole::SuperAdmin)
        .await?;
    if assignment.is_none() {
        warn!(
            subject = %subject,
            account_id = %account_id,
            "bootstrapped subject holds no role"
        );
    }

    let display_name = payload
        .display_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| subject.clone());
    let identity = UserIdentity::new(subject, display_name, payload.email, account_id);
    let context = state.user_role_service.resolve_context(&identity).await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;
    cache_context(&session, &context).await?;

    info!(
        subject = identity.subject(),
        account_id = %identity.account_id(),
        role_id = ?context.role_id().map(|role_id| role_id.as_str()),
        "session bootstrapped"
    );

    Ok(Json(SessionResponse::new(&identity, &context)))
}
