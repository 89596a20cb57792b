use std::collections::BTreeMap;

use campusguard_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Permission, PermissionKey};

/// Flat permission flag dictionary attached to a role.
///
/// Serialized as a JSON object of string keys to booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<PermissionKey, bool>);

impl PermissionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a map listing every known permission, granting only `granted`.
    #[must_use]
    pub fn explicit(granted: &[Permission]) -> Self {
        Self(
            Permission::all()
                .iter()
                .map(|permission| {
                    (
                        PermissionKey::Known(*permission),
                        granted.contains(permission),
                    )
                })
                .collect(),
        )
    }

    /// Builds a map from an untyped JSON object, rejecting non-boolean values.
    pub fn from_json_object(object: &Map<String, Value>) -> AppResult<Self> {
        object
            .iter()
            .map(|(key, value)| match value {
                Value::Bool(flag) => {
                    if key.trim().is_empty() {
                        return Err(AppError::Validation(
                            "permission keys must not be empty".to_owned(),
                        ));
                    }
                    Ok((PermissionKey::parse(key), *flag))
                }
                other => Err(AppError::Validation(format!(
                    "permission '{key}' must be a boolean, got {}",
                    json_type_name(other)
                ))),
            })
            .collect::<AppResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    /// Returns the stored flag for `key`, if set.
    #[must_use]
    pub fn get(&self, key: &PermissionKey) -> Option<bool> {
        self.0.get(key).copied()
    }

    /// Sets the flag for `key`.
    pub fn set(&mut self, key: impl Into<PermissionKey>, granted: bool) {
        self.0.insert(key.into(), granted);
    }

    /// Removes the flag for `key`, returning the previous value.
    pub fn remove(&mut self, key: &PermissionKey) -> Option<bool> {
        self.0.remove(key)
    }

    /// Builder-style variant of [`PermissionMap::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<PermissionKey>, granted: bool) -> Self {
        self.set(key, granted);
        self
    }

    /// Returns the number of stored flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no flags are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over every stored flag.
    pub fn iter(&self) -> impl Iterator<Item = (&PermissionKey, bool)> {
        self.0.iter().map(|(key, granted)| (key, *granted))
    }

    /// Iterates over the known permissions that are granted.
    pub fn granted(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0
            .iter()
            .filter_map(|(key, granted)| if *granted { key.known() } else { None })
    }

    /// Iterates over stored keys outside the known catalogue.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(|key| match key {
            PermissionKey::Unknown(raw) => Some(raw.as_str()),
            PermissionKey::Known(_) => None,
        })
    }
}

impl FromIterator<(PermissionKey, bool)> for PermissionMap {
    fn from_iter<T: IntoIterator<Item = (PermissionKey, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use campusguard_core::AppError;
    use serde_json::json;

    use super::PermissionMap;
    use crate::{Permission, PermissionKey};

    #[test]
    fn json_object_with_non_boolean_is_rejected() {
        let payload = json!({ "resources.view_all": "yes" });
        let object = payload.as_object().cloned().unwrap_or_default();

        let result = PermissionMap::from_json_object(&object);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn json_object_keeps_unknown_keys() {
        let payload = json!({
            "resources.view_all": true,
            "incidents.reports.file": false,
        });
        let object = payload.as_object().cloned().unwrap_or_default();

        let map = PermissionMap::from_json_object(&object).unwrap_or_default();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&PermissionKey::Known(Permission::ResourcesViewAll)),
            Some(true)
        );
        assert_eq!(
            map.unknown_keys().collect::<Vec<_>>(),
            vec!["incidents.reports.file"]
        );
    }

    #[test]
    fn serializes_as_flat_object() {
        let map = PermissionMap::new()
            .with(Permission::AdminUsersManage, true)
            .with("incidents.reports.file", false);

        let value = serde_json::to_value(&map).unwrap_or_default();
        assert_eq!(
            value,
            json!({ "admin.users.manage": true, "incidents.reports.file": false })
        );

        let restored = serde_json::from_value::<PermissionMap>(value);
        assert_eq!(restored.ok(), Some(map));
    }

    #[test]
    fn explicit_map_lists_every_known_permission() {
        let map = PermissionMap::explicit(&[Permission::MapCampusView]);
        assert_eq!(map.len(), Permission::all().len());
        assert_eq!(map.granted().collect::<Vec<_>>(), vec![Permission::MapCampusView]);
    }
}
