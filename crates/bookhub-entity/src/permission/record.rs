//! Per-account authorization state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use bookhub_core::types::AccountId;

use crate::account::Role;

use super::key::PermissionKey;

/// Claim type under which permission grants are stored.
pub const CLAIM_TYPE_PERMISSION: &str = "Permission";

/// A single permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionClaim {
    /// Account holding the claim.
    pub account_id: AccountId,
    /// Granted key.
    pub permission: PermissionKey,
}

/// Role and claims of one account, replaced as a unit.
///
/// Role and claims are independent: the claims are not derived from the
/// role and may grant more or less than the role's nominal defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Primary role, if any.
    pub role: Option<Role>,
    /// Granted permission keys.
    pub permissions: BTreeSet<PermissionKey>,
}

impl AuthorizationRecord {
    /// Builds a record from a role and keys.
    pub fn new(role: Option<Role>, permissions: impl IntoIterator<Item = PermissionKey>) -> Self {
        Self {
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Expands the record into individual claims for `account_id`.
    pub fn claims(&self, account_id: AccountId) -> Vec<PermissionClaim> {
        self.permissions
            .iter()
            .map(|permission| PermissionClaim {
                account_id,
                permission: *permission,
            })
            .collect()
    }

    /// Label used by listings: the role name or `"No Role"`.
    pub fn role_label(&self) -> &'static str {
        self.role.map(|r| r.as_str()).unwrap_or("No Role")
    }
}
