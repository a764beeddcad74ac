//! Read side of the authorization relations.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use bookhub_core::result::AppResult;
use bookhub_core::types::AccountId;
use bookhub_database::AuthorizationStore;
use bookhub_entity::account::Role;
use bookhub_entity::permission::{AuthorizationRecord, PermissionKey};

use crate::rbac::RolePolicies;

/// Divergence between an account's claims and its role's nominal defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionDrift {
    /// Role the comparison was made against.
    pub role: Option<Role>,
    /// Defaults of the role the account does not hold.
    pub missing: BTreeSet<PermissionKey>,
    /// Claims beyond the role's defaults.
    pub extra: BTreeSet<PermissionKey>,
}

impl PermissionDrift {
    /// Whether the claims equal the role's defaults.
    pub fn is_aligned(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Answers role and permission questions about an account.
///
/// Effective permissions are exactly the attached claims. The role is a
/// coarse label and contributes nothing at read time.
#[derive(Debug, Clone)]
pub struct AuthorizationModel {
    store: Arc<dyn AuthorizationStore>,
    policies: RolePolicies,
}

impl AuthorizationModel {
    /// Creates a model reading from `store`.
    pub fn new(store: Arc<dyn AuthorizationStore>, policies: RolePolicies) -> Self {
        Self { store, policies }
    }

    /// The role defaults used for drift reports.
    pub fn policies(&self) -> &RolePolicies {
        &self.policies
    }

    /// Role and claims in one consistent read.
    pub async fn record(&self, account_id: AccountId) -> AppResult<AuthorizationRecord> {
        self.store.record(account_id).await
    }

    /// The permission claims attached to the account.
    pub async fn effective_permissions(
        &self,
        account_id: AccountId,
    ) -> AppResult<BTreeSet<PermissionKey>> {
        Ok(self.store.record(account_id).await?.permissions)
    }

    /// The account's primary role, if any.
    pub async fn role_of(&self, account_id: AccountId) -> AppResult<Option<Role>> {
        Ok(self.store.record(account_id).await?.role)
    }

    /// Fine-grained check of a single key.
    pub async fn has_permission(&self, account_id: AccountId, key: PermissionKey) -> AppResult<bool> {
        Ok(self.effective_permissions(account_id).await?.contains(&key))
    }

    /// Compares the account's claims with its role's defaults.
    ///
    /// An account without a role is compared against an empty default set.
    pub async fn drift(&self, account_id: AccountId) -> AppResult<PermissionDrift> {
        let record = self.store.record(account_id).await?;
        let defaults = record
            .role
            .map(|role| self.policies.defaults(role))
            .unwrap_or_default();

        Ok(PermissionDrift {
            role: record.role,
            missing: defaults.difference(&record.permissions).copied().collect(),
            extra: record.permissions.difference(&defaults).copied().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookhub_database::MemoryAuthorizationStore;

    async fn grant(
        store: &MemoryAuthorizationStore,
        id: AccountId,
        role: Option<Role>,
        keys: &[PermissionKey],
    ) {
        let mut tx = store.begin(id).await.unwrap();
        if let Some(role) = role {
            tx.add_role(role).await.unwrap();
        }
        tx.add_permission_claims(&keys.iter().copied().collect())
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_role_does_not_grant_permissions() {
        let store = MemoryAuthorizationStore::new();
        let id = AccountId::new();
        grant(&store, id, Some(Role::Admin), &[]).await;

        let model = AuthorizationModel::new(Arc::new(store), RolePolicies::new());
        assert_eq!(model.role_of(id).await.unwrap(), Some(Role::Admin));
        assert!(model.effective_permissions(id).await.unwrap().is_empty());
        assert!(!model.has_permission(id, PermissionKey::UserManage).await.unwrap());
    }

    #[tokio::test]
    async fn test_claims_without_role_still_count() {
        let store = MemoryAuthorizationStore::new();
        let id = AccountId::new();
        grant(&store, id, None, &[PermissionKey::OrderView]).await;

        let model = AuthorizationModel::new(Arc::new(store), RolePolicies::new());
        assert!(model.has_permission(id, PermissionKey::OrderView).await.unwrap());
    }

    #[tokio::test]
    async fn test_drift_reports_missing_and_extra() {
        let store = MemoryAuthorizationStore::new();
        let id = AccountId::new();
        grant(
            &store,
            id,
            Some(Role::Staff),
            &[
                PermissionKey::BookView,
                PermissionKey::BookCreate,
                PermissionKey::BookUpdate,
                PermissionKey::OrderView,
                PermissionKey::UserView,
            ],
        )
        .await;

        let model = AuthorizationModel::new(Arc::new(store), RolePolicies::new());
        let drift = model.drift(id).await.unwrap();
        assert_eq!(drift.missing, BTreeSet::from([PermissionKey::OrderUpdate]));
        assert_eq!(drift.extra, BTreeSet::from([PermissionKey::UserView]));
        assert!(!drift.is_aligned());
    }

    #[tokio::test]
    async fn test_unknown_account_has_nothing() {
        let model = AuthorizationModel::new(
            Arc::new(MemoryAuthorizationStore::new()),
            RolePolicies::new(),
        );
        let id = AccountId::new();
        assert_eq!(model.role_of(id).await.unwrap(), None);
        assert!(model.drift(id).await.unwrap().is_aligned());
    }
}
