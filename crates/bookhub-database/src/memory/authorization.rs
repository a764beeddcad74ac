//! In-memory role and claim relations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::types::AccountId;
use bookhub_entity::account::Role;
use bookhub_entity::permission::{AuthorizationRecord, PermissionKey};

use crate::repositories::{AuthorizationStore, AuthorizationTransaction};

type Records = HashMap<AccountId, AuthorizationRecord>;

/// Role memberships and permission claims held in a process-local map.
///
/// A transaction owns the write guard of the whole relation until it commits
/// or rolls back, so readers see either the old or the new record of an
/// account, never a mix.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthorizationStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryAuthorizationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationStore for MemoryAuthorizationStore {
    async fn record(&self, account_id: AccountId) -> AppResult<AuthorizationRecord> {
        Ok(self
            .records
            .read()
            .await
            .get(&account_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn begin(&self, account_id: AccountId) -> AppResult<Box<dyn AuthorizationTransaction>> {
        let guard = self.records.clone().write_owned().await;
        let staged = guard.get(&account_id).cloned().unwrap_or_default();
        Ok(Box::new(MemoryAuthorizationTransaction {
            guard,
            account_id,
            staged,
        }))
    }
}

/// Transaction over one account's record.
struct MemoryAuthorizationTransaction {
    guard: OwnedRwLockWriteGuard<Records>,
    account_id: AccountId,
    staged: AuthorizationRecord,
}

#[async_trait]
impl AuthorizationTransaction for MemoryAuthorizationTransaction {
    fn current(&self) -> &AuthorizationRecord {
        &self.staged
    }

    async fn remove_roles(&mut self) -> AppResult<Vec<Role>> {
        Ok(self.staged.role.take().into_iter().collect())
    }

    async fn add_role(&mut self, role: Role) -> AppResult<()> {
        if let Some(existing) = self.staged.role {
            return Err(AppError::conflict(format!(
                "Account {} already holds role {existing}",
                self.account_id
            )));
        }
        self.staged.role = Some(role);
        Ok(())
    }

    async fn remove_permission_claims(&mut self) -> AppResult<usize> {
        let removed = self.staged.permissions.len();
        self.staged.permissions.clear();
        Ok(removed)
    }

    async fn add_permission_claims(&mut self, keys: &BTreeSet<PermissionKey>) -> AppResult<()> {
        self.staged.permissions.extend(keys.iter().copied());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self {
            mut guard,
            account_id,
            staged,
        } = *self;
        if staged == AuthorizationRecord::default() {
            guard.remove(&account_id);
        } else {
            guard.insert(account_id, staged);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}
