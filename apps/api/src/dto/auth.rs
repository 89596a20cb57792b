use campusguard_core::UserIdentity;
use campusguard_domain::PermissionContext;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PermissionContextResponse;

/// Incoming payload for token-protected session bootstrap.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub account_id: String,
    pub subject: String,
    #[ts(optional)]
    pub display_name: Option<String>,
    #[ts(optional)]
    pub email: Option<String>,
}

/// Authenticated identity together with its resolved permissions.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub account_id: String,
    pub context: PermissionContextResponse,
}

impl SessionResponse {
    /// Builds the response from a session identity and its cached context.
    #[must_use]
    pub fn new(identity: &UserIdentity, context: &PermissionContext) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            account_id: identity.account_id().to_string(),
            context: PermissionContextResponse::from(context),
        }
    }
}
