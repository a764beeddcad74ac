//! Role-membership and permission-claim relations.

use std::collections::BTreeSet;

use async_trait::async_trait;

use bookhub_core::result::AppResult;
use bookhub_core::types::AccountId;
use bookhub_entity::account::Role;
use bookhub_entity::permission::{AuthorizationRecord, PermissionKey};

/// Read access and transactional write access to per-account role and
/// claims.
#[async_trait]
pub trait AuthorizationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Current role and claims of an account. Accounts without any grants
    /// yield an empty record.
    ///
    /// Never observes a half-applied transaction.
    async fn record(&self, account_id: AccountId) -> AppResult<AuthorizationRecord>;

    /// Opens a transaction over one account's role and claims. Concurrent
    /// transactions on the same account are serialized.
    async fn begin(&self, account_id: AccountId) -> AppResult<Box<dyn AuthorizationTransaction>>;
}

/// Staged changes to one account's authorization record.
///
/// Nothing is visible to readers until [`commit`](Self::commit). Dropping a
/// transaction without committing discards it.
#[async_trait]
pub trait AuthorizationTransaction: Send {
    /// The record as staged so far.
    fn current(&self) -> &AuthorizationRecord;

    /// Removes every role membership. Returns the removed roles.
    async fn remove_roles(&mut self) -> AppResult<Vec<Role>>;

    /// Adds a role membership. Fails if the account already holds a role.
    async fn add_role(&mut self, role: Role) -> AppResult<()>;

    /// Removes every claim of type "Permission". Returns how many were removed.
    async fn remove_permission_claims(&mut self) -> AppResult<usize>;

    /// Adds permission claims. Keys already held are left as they are.
    async fn add_permission_claims(&mut self, keys: &BTreeSet<PermissionKey>) -> AppResult<()>;

    /// Publishes the staged record.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discards the staged record.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
