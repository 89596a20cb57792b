use std::collections::BTreeMap;

use campusguard_application::{SeedOutcome, UserRoleAssignment};
use campusguard_domain::{PermissionContext, PermissionMap, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[ts(type = "Record<string, boolean>")]
    pub permissions: Map<String, Value>,
    #[serde(default)]
    pub is_system: bool,
}

/// Incoming payload for a partial role update.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub description: Option<String>,
    #[ts(type = "Record<string, boolean> | null")]
    pub permissions: Option<Map<String, Value>>,
}

/// Incoming payload for assigning a role to a subject.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

/// Query parameters for listing roles.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRolesQuery {
    pub account_id: Option<String>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub description: String,
    pub permissions: BTreeMap<String, bool>,
    pub is_system: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.role_id().as_str().to_owned(),
            account_id: value.account_id().to_string(),
            name: value.name().to_owned(),
            description: value.description().to_owned(),
            permissions: flat_permissions(value.permissions()),
            is_system: value.is_system(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// API representation of a subject's role assignment.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub subject: String,
    pub role_id: String,
    pub assigned_at: String,
}

impl From<UserRoleAssignment> for RoleAssignmentResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            subject: value.subject,
            role_id: value.role_id.as_str().to_owned(),
            assigned_at: value.assigned_at.to_rfc3339(),
        }
    }
}

/// Result of a default-role seeding run.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/seed-outcome-response.ts"
)]
pub struct SeedOutcomeResponse {
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
}

impl From<SeedOutcome> for SeedOutcomeResponse {
    fn from(value: SeedOutcome) -> Self {
        Self {
            inserted: value
                .inserted
                .iter()
                .map(|role_id| role_id.as_str().to_owned())
                .collect(),
            skipped: value
                .skipped
                .iter()
                .map(|role_id| role_id.as_str().to_owned())
                .collect(),
        }
    }
}

/// Effective permissions handed to UI guards.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-context-response.ts"
)]
pub struct PermissionContextResponse {
    pub role_id: Option<String>,
    pub permissions: BTreeMap<String, bool>,
    pub resolved_at: String,
}

impl From<&PermissionContext> for PermissionContextResponse {
    fn from(value: &PermissionContext) -> Self {
        Self {
            role_id: value.role_id().map(|role_id| role_id.as_str().to_owned()),
            permissions: flat_permissions(value.permissions()),
            resolved_at: value.resolved_at().to_rfc3339(),
        }
    }
}

fn flat_permissions(permissions: &PermissionMap) -> BTreeMap<String, bool> {
    permissions
        .iter()
        .map(|(key, granted)| (key.as_str().to_owned(), granted))
        .collect()
}

#[cfg(test)]
mod tests {
    use campusguard_core::AccountId;
    use campusguard_domain::{DefaultRole, Role};
    use chrono::Utc;

    use super::RoleResponse;

    #[test]
    fn role_response_flattens_permission_map() {
        let account_id = AccountId::new("acme").unwrap_or_else(|_| unreachable!());
        let role = Role::from_default(DefaultRole::Guest, account_id, Utc::now());

        let response = RoleResponse::from(role);

        assert_eq!(response.id, "guest");
        assert!(response.is_system);
        assert_eq!(response.permissions.get("map.campus.view"), Some(&true));
        assert_eq!(response.permissions.get("admin.roles.manage"), Some(&false));
    }
}
