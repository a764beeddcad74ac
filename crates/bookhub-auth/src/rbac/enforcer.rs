//! Coarse role checks guarding whole areas (admin area, user deletion).

use bookhub_core::error::AppError;
use bookhub_entity::account::Role;

/// Route-level role gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleGate;

impl RoleGate {
    /// Roles allowed into the administration area.
    pub const ADMIN_AREA: [Role; 2] = [Role::Admin, Role::Staff];

    /// Requires `actual` to be one of `allowed`.
    pub fn require_any(actual: Option<Role>, allowed: &[Role]) -> Result<(), AppError> {
        match actual {
            Some(role) if allowed.contains(&role) => Ok(()),
            Some(role) => Err(AppError::forbidden(format!(
                "Role '{role}' is not allowed here; required one of: {}",
                list(allowed)
            ))),
            None => Err(AppError::forbidden(format!(
                "An account without a role is not allowed here; required one of: {}",
                list(allowed)
            ))),
        }
    }

    /// Requires `actual` to be exactly `required`.
    pub fn require_role(actual: Option<Role>, required: Role) -> Result<(), AppError> {
        Self::require_any(actual, &[required])
    }

    /// Returns whether the role is an admin.
    pub fn is_admin(actual: Option<Role>) -> bool {
        actual.is_some_and(|role| role.is_admin())
    }
}

fn list(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
