use std::fmt::{Display, Formatter};

use campusguard_core::{AccountId, AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DefaultRole, PermissionMap};

/// Maximum accepted role name length, in characters.
pub const ROLE_NAME_MAX_LENGTH: usize = 120;

/// Maximum accepted role description length, in characters.
pub const ROLE_DESCRIPTION_MAX_LENGTH: usize = 1000;

/// Role identifier, unique within an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from an existing value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("role id must not be empty".to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Generates a fresh identifier for a custom role.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.0
    }
}

impl From<DefaultRole> for RoleId {
    fn from(value: DefaultRole) -> Self {
        Self(value.key().to_owned())
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Account-scoped role with its permission flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    role_id: RoleId,
    account_id: AccountId,
    name: String,
    description: String,
    permissions: PermissionMap,
    is_system: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Partial update for a role. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement permission map.
    pub permissions: Option<PermissionMap>,
}

impl RolePatch {
    /// Returns whether the patch would change permission flags.
    #[must_use]
    pub fn touches_permissions(&self) -> bool {
        self.permissions.is_some()
    }

    /// Returns whether the patch carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.permissions.is_none()
    }
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        role_id: RoleId,
        account_id: AccountId,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: PermissionMap,
        is_system: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            role_id,
            account_id,
            name: validate_name(name.into())?,
            description: validate_description(description.into())?,
            permissions,
            is_system,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds the system role seeded for `default_role` in an account.
    #[must_use]
    pub fn from_default(default_role: DefaultRole, account_id: AccountId, now: DateTime<Utc>) -> Self {
        Self {
            role_id: RoleId::from(default_role),
            account_id,
            name: default_role.display_name().to_owned(),
            description: default_role.description().to_owned(),
            permissions: default_role.permission_map(),
            is_system: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch, enforcing system-role immutability.
    ///
    /// System roles reject any patch that carries permissions, even an
    /// identical map, and are left untouched when rejected.
    pub fn apply_patch(&mut self, patch: RolePatch, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_system && patch.touches_permissions() {
            return Err(AppError::PermissionDenied(format!(
                "permissions of system role '{}' cannot be modified",
                self.role_id
            )));
        }

        let name = patch.name.map(validate_name).transpose()?;
        let description = patch.description.map(validate_description).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
        self.updated_at = now;

        Ok(())
    }

    /// Fails when the role may not be deleted.
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::PermissionDenied(format!(
                "system role '{}' cannot be deleted",
                self.role_id
            )));
        }

        Ok(())
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }

    /// Returns the owning account.
    #[must_use]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the permission flags.
    #[must_use]
    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    /// Returns whether this is an immutable system role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rebuilds a role from persisted columns without re-stamping timestamps.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        role_id: RoleId,
        account_id: AccountId,
        name: String,
        description: String,
        permissions: PermissionMap,
        is_system: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            role_id,
            account_id,
            name: validate_name(name)?,
            description,
            permissions,
            is_system,
            created_at,
            updated_at,
        })
    }
}

fn validate_name(value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("role name must not be empty".to_owned()));
    }

    if trimmed.chars().count() > ROLE_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_owned())
}

fn validate_description(value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > ROLE_DESCRIPTION_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role description must not exceed {ROLE_DESCRIPTION_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use campusguard_core::{AccountId, AppError};
    use chrono::{Duration, Utc};

    use super::{Role, RoleId, RolePatch};
    use crate::{DefaultRole, Permission, PermissionKey, PermissionMap};

    fn acme() -> AccountId {
        AccountId::new("acme").unwrap_or_else(|_| unreachable!())
    }

    fn custodian() -> Role {
        Role::new(
            RoleId::generate(),
            acme(),
            "Custodian",
            "",
            PermissionMap::new().with(Permission::ResourcesViewAll, true),
            false,
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn blank_name_is_rejected() {
        let result = Role::new(
            RoleId::generate(),
            acme(),
            "   ",
            "",
            PermissionMap::new(),
            false,
            Utc::now(),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn oversized_name_is_rejected() {
        let result = Role::new(
            RoleId::generate(),
            acme(),
            "x".repeat(121),
            "",
            PermissionMap::new(),
            false,
            Utc::now(),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn custom_role_permissions_can_be_patched() {
        let mut role = custodian();
        let later = role.updated_at() + Duration::seconds(5);

        let result = role.apply_patch(
            RolePatch {
                permissions: Some(PermissionMap::new().with(Permission::ResourcesViewAll, false)),
                ..RolePatch::default()
            },
            later,
        );

        assert!(result.is_ok());
        assert_eq!(
            role.permissions()
                .get(&PermissionKey::Known(Permission::ResourcesViewAll)),
            Some(false)
        );
        assert_eq!(role.updated_at(), later);
        assert!(role.created_at() < later);
    }

    #[test]
    fn system_role_rejects_permission_patch_and_stays_unchanged() {
        let mut role = Role::from_default(DefaultRole::User, acme(), Utc::now());
        let before = role.clone();

        let result = role.apply_patch(
            RolePatch {
                name: Some("Renamed".to_owned()),
                permissions: Some(before.permissions().clone()),
                ..RolePatch::default()
            },
            Utc::now(),
        );

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
        assert_eq!(role, before);
    }

    #[test]
    fn system_role_accepts_description_patch() {
        let mut role = Role::from_default(DefaultRole::Guest, acme(), Utc::now());

        let result = role.apply_patch(
            RolePatch {
                description: Some("Visitors and contractors".to_owned()),
                ..RolePatch::default()
            },
            Utc::now(),
        );

        assert!(result.is_ok());
        assert_eq!(role.description(), "Visitors and contractors");
        assert!(role.is_system());
    }

    #[test]
    fn invalid_patch_leaves_role_unchanged() {
        let mut role = custodian();
        let before = role.clone();

        let result = role.apply_patch(
            RolePatch {
                name: Some(" ".to_owned()),
                description: Some("new".to_owned()),
                ..RolePatch::default()
            },
            Utc::now(),
        );

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(role, before);
    }

    #[test]
    fn system_role_is_not_deletable() {
        let role = Role::from_default(DefaultRole::Admin, acme(), Utc::now());
        assert!(matches!(
            role.ensure_deletable(),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(custodian().ensure_deletable().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let role = Role::from_default(DefaultRole::Guest, acme(), Utc::now());
        let value = serde_json::to_value(&role).unwrap_or_default();

        assert_eq!(value["roleId"], "guest");
        assert_eq!(value["accountId"], "acme");
        assert_eq!(value["isSystem"], true);
        assert_eq!(value["permissions"]["map.campus.view"], true);
    }
}
