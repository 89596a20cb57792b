//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_service;
mod role_ports;
mod role_service;
mod user_role_ports;
mod user_role_service;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::AuthorizationService;
pub use role_ports::{CreateRoleInput, RoleRepository, SeedOutcome};
pub use role_service::RoleService;
pub use user_role_ports::{UserRoleAssignment, UserRoleRepository};
pub use user_role_service::UserRoleService;
