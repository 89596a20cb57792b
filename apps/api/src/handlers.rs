mod assignments;
mod health;
mod permissions;
mod roles;

pub use assignments::{assign_role_handler, list_role_assignments_handler};
pub use health::health_handler;
pub use permissions::list_permissions_handler;
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, list_roles_handler,
    reseed_default_roles_handler, update_role_handler,
};
