//! Role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use bookhub_core::AppError;

/// Coarse authorization tier. An account holds at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full back-office access.
    Admin,
    /// Back-office access without user deletion.
    Staff,
    /// Storefront customer.
    Customer,
}

impl Role {
    /// Every role in the catalog.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Customer];

    /// Roles an administrator may assign from the user edit screen.
    pub const ASSIGNABLE: [Role; 2] = [Role::Admin, Role::Staff];

    /// Return the role name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Staff => "Staff",
            Self::Customer => "Customer",
        }
    }

    /// Whether the role may be assigned through the administrator.
    pub fn is_assignable(&self) -> bool {
        Self::ASSIGNABLE.contains(self)
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            _ => Err(AppError::invalid_field(
                "role",
                format!("Invalid role: '{s}'. Expected one of: Admin, Staff, Customer"),
            )),
        }
    }
}
