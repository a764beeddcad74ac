//! Nominal permission sets of each role.

use std::collections::{BTreeSet, HashMap};

use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

/// Maps each role to the permissions it nominally carries.
///
/// These sets are used when seeding accounts and when reporting drift. They
/// are never merged into an account's effective permissions.
#[derive(Debug, Clone)]
pub struct RolePolicies {
    /// Role → default permission keys.
    policies: HashMap<Role, BTreeSet<PermissionKey>>,
}

impl RolePolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        // Customer: browse the catalog
        policies.insert(Role::Customer, BTreeSet::from([PermissionKey::BookView]));

        // Staff: catalog upkeep and order handling, no deletions
        policies.insert(
            Role::Staff,
            BTreeSet::from([
                PermissionKey::BookCreate,
                PermissionKey::BookView,
                PermissionKey::BookUpdate,
                PermissionKey::OrderView,
                PermissionKey::OrderUpdate,
            ]),
        );

        // Admin: everything
        policies.insert(Role::Admin, PermissionKey::ALL.into_iter().collect());

        Self { policies }
    }

    /// Default keys of `role`.
    pub fn defaults(&self, role: Role) -> BTreeSet<PermissionKey> {
        self.policies.get(&role).cloned().unwrap_or_default()
    }

    /// Whether `key` is among the defaults of `role`.
    pub fn has_default(&self, role: Role, key: PermissionKey) -> bool {
        self.policies
            .get(&role)
            .is_some_and(|keys| keys.contains(&key))
    }
}

impl Default for RolePolicies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_defaults_cover_catalog() {
        let policies = RolePolicies::new();
        assert_eq!(policies.defaults(Role::Admin).len(), PermissionKey::ALL.len());
    }

    #[test]
    fn test_staff_cannot_delete_or_manage_users() {
        let policies = RolePolicies::new();
        assert!(policies.has_default(Role::Staff, PermissionKey::BookUpdate));
        assert!(!policies.has_default(Role::Staff, PermissionKey::BookDelete));
        assert!(!policies.has_default(Role::Staff, PermissionKey::UserManage));
    }

    #[test]
    fn test_customer_only_views_books() {
        let policies = RolePolicies::new();
        assert_eq!(
            policies.defaults(Role::Customer),
            BTreeSet::from([PermissionKey::BookView])
        );
    }
}
