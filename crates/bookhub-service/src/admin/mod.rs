//! User administration.

pub mod service;

pub use service::{AdminService, EditUserView, PermissionOption, RoleOption, UserSummary};
