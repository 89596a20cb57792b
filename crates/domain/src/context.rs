use campusguard_core::{AccountId, AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::{can_all, can_any, has_permission};
use crate::{Permission, PermissionKey, PermissionMap, RoleId};

/// Effective permissions of one subject, resolved from their role.
///
/// Built once when the session is loaded and handed explicitly to guards.
/// Server-side mutations never trust a cached context and re-resolve instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionContext {
    subject: String,
    account_id: AccountId,
    role_id: Option<RoleId>,
    permissions: PermissionMap,
    resolved_at: DateTime<Utc>,
}

impl PermissionContext {
    /// Creates a context for a subject resolved to `role_id`.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        account_id: AccountId,
        role_id: Option<RoleId>,
        permissions: PermissionMap,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject: subject.into(),
            account_id,
            role_id,
            permissions,
            resolved_at,
        }
    }

    /// Creates a context that grants nothing.
    #[must_use]
    pub fn denied(subject: impl Into<String>, account_id: AccountId, resolved_at: DateTime<Utc>) -> Self {
        Self::new(subject, account_id, None, PermissionMap::new(), resolved_at)
    }

    /// Returns the subject this context belongs to.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the account scope.
    #[must_use]
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Returns the resolved role, if the subject has one.
    #[must_use]
    pub fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }

    /// Returns the effective permission flags.
    #[must_use]
    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    /// Returns when the context was resolved.
    #[must_use]
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    /// Returns whether `key` is granted.
    #[must_use]
    pub fn has(&self, key: impl Into<PermissionKey>) -> bool {
        has_permission(Some(&self.permissions), key)
    }

    /// Returns whether any of `keys` is granted.
    #[must_use]
    pub fn any<I>(&self, keys: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<PermissionKey>,
    {
        can_any(Some(&self.permissions), keys)
    }

    /// Returns whether all of `keys` are granted.
    #[must_use]
    pub fn all<I>(&self, keys: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<PermissionKey>,
    {
        can_all(Some(&self.permissions), keys)
    }

    /// Fails with [`AppError::PermissionDenied`] unless `permission` is granted.
    pub fn require(&self, permission: Permission) -> AppResult<()> {
        if self.has(permission) {
            return Ok(());
        }

        Err(AppError::PermissionDenied(format!(
            "subject '{}' is missing permission '{}' in account '{}'",
            self.subject,
            permission.as_str(),
            self.account_id
        )))
    }
}

/// Access requirement checked by a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A single permission must be granted.
    One(PermissionKey),
    /// At least one of the permissions must be granted.
    Any(Vec<PermissionKey>),
    /// Every permission must be granted.
    All(Vec<PermissionKey>),
}

impl Requirement {
    /// Builds a single-permission requirement.
    #[must_use]
    pub fn one(key: impl Into<PermissionKey>) -> Self {
        Self::One(key.into())
    }

    /// Builds an any-of requirement.
    #[must_use]
    pub fn any<I>(keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PermissionKey>,
    {
        Self::Any(keys.into_iter().map(Into::into).collect())
    }

    /// Builds an all-of requirement.
    #[must_use]
    pub fn all<I>(keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PermissionKey>,
    {
        Self::All(keys.into_iter().map(Into::into).collect())
    }
}

/// Guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Render the protected content.
    Granted,
    /// Render the fallback content.
    Denied,
}

impl Access {
    /// Returns whether access was granted.
    #[must_use]
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Evaluates a requirement against an optional context.
///
/// A missing context (for example while the profile is still loading) always
/// denies, including for an empty all-of requirement.
#[must_use]
pub fn guard(context: Option<&PermissionContext>, requirement: &Requirement) -> Access {
    let Some(context) = context else {
        return Access::Denied;
    };

    let granted = match requirement {
        Requirement::One(key) => context.has(key),
        Requirement::Any(keys) => context.any(keys),
        Requirement::All(keys) => context.all(keys),
    };

    if granted {
        Access::Granted
    } else {
        Access::Denied
    }
}
