//! Users and roles.

mod models;
mod repository;

pub use models::{
    InvalidRole, RegisterRequest, Registration, Role, UpdateRoleRequest, UserInfo, UserRecord,
};
