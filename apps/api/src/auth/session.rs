use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use campusguard_core::AppError;
use tower_sessions::Session;

use crate::dto::SessionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::{cache_context, cached_context, session_identity};

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the session identity with the permission context cached at load time.
pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    let identity = session_identity(&session).await?;

    let context = match cached_context(&session).await? {
        Some(context) => context,
        None => {
            let context = state.user_role_service.resolve_context(&identity).await?;
            cache_context(&session, &context).await?;
            context
        }
    };

    Ok(Json(SessionResponse::new(&identity, &context)))
}

/// Re-reads the subject's role and replaces the cached context.
pub async fn refresh_context_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    let identity = session_identity(&session).await?;
    let context = state.user_role_service.resolve_context(&identity).await?;
    cache_context(&session, &context).await?;

    Ok(Json(SessionResponse::new(&identity, &context)))
}
