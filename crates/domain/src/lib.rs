//! Domain entities and invariants for account roles and permissions.

#![forbid(unsafe_code)]

mod audit;
mod context;
mod default_roles;
pub mod evaluator;
mod permission;
mod permission_map;
mod role;

pub use audit::AuditAction;
pub use context::{Access, PermissionContext, Requirement, guard};
pub use default_roles::{DEFAULT_ROLE_TABLE_VERSION, DefaultRole};
pub use evaluator::{can_all, can_any, has_permission};
pub use permission::{Permission, PermissionKey};
pub use permission_map::PermissionMap;
pub use role::{ROLE_DESCRIPTION_MAX_LENGTH, ROLE_NAME_MAX_LENGTH, Role, RoleId, RolePatch};
