use campusguard_core::{AppError, UserIdentity};
use campusguard_domain::PermissionContext;
use tower_sessions::Session;

mod bootstrap;
mod session;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler, refresh_context_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Permission context resolved when the session was established or refreshed.
pub const SESSION_PERMISSIONS_KEY: &str = "permission_context";

pub(super) async fn session_identity(session: &Session) -> Result<UserIdentity, AppError> {
    session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}

pub(super) async fn cached_context(session: &Session) -> Result<Option<PermissionContext>, AppError> {
    session
        .get::<PermissionContext>(SESSION_PERMISSIONS_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session permission context: {error}"))
        })
}

pub(super) async fn cache_context(
    session: &Session,
    context: &PermissionContext,
) -> Result<(), AppError> {
    session
        .insert(SESSION_PERMISSIONS_KEY, context)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to persist session permission context: {error}"
            ))
        })
}
