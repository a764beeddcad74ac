//! Per-account serialization of credential changes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use bookhub_core::types::AccountId;

/// One async mutex per account.
///
/// Every sequence that reads or clears the temporary credential cache and
/// then rewrites the permanent credential (issuance, redemption, password
/// change) holds the account's lock for the whole sequence, so a password
/// change can never be overwritten by a redemption that started before it.
#[derive(Debug, Default)]
pub struct CredentialLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl CredentialLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the lock of `account_id`.
    pub async fn acquire(&self, account_id: AccountId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(account_id).or_default().clone();
        lock.lock_owned().await
    }
}
