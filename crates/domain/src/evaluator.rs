//! Pure permission predicates.
//!
//! None of these functions fail: an absent map, an unset key or a key outside
//! the known catalogue all evaluate to "not granted".

use crate::{PermissionKey, PermissionMap};

/// Returns the flag stored at `key`, or `false` when the map is absent or the
/// key is unset.
#[must_use]
pub fn has_permission(map: Option<&PermissionMap>, key: impl Into<PermissionKey>) -> bool {
    let Some(map) = map else {
        return false;
    };

    map.get(&key.into()).unwrap_or(false)
}

/// Returns `true` when at least one key is granted. Empty key lists are never granted.
#[must_use]
pub fn can_any<I>(map: Option<&PermissionMap>, keys: I) -> bool
where
    I: IntoIterator,
    I::Item: Into<PermissionKey>,
{
    keys.into_iter().any(|key| has_permission(map, key))
}

/// Returns `true` when every key is granted. Empty key lists are vacuously granted.
#[must_use]
pub fn can_all<I>(map: Option<&PermissionMap>, keys: I) -> bool
where
    I: IntoIterator,
    I::Item: Into<PermissionKey>,
{
    keys.into_iter().all(|key| has_permission(map, key))
}
