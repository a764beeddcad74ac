//! Argon2-backed credential store on top of the account repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::traits::CredentialStore;
use bookhub_core::types::AccountId;
use bookhub_database::AccountRepository;

use crate::password::PasswordHasher;

/// Keeps each account's verifier as an Argon2id PHC string in the account
/// row.
#[derive(Debug, Clone)]
pub struct HashedCredentialStore {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<PasswordHasher>,
}

impl HashedCredentialStore {
    /// Creates a store writing through `accounts`.
    pub fn new(accounts: Arc<dyn AccountRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }
}

#[async_trait]
impl CredentialStore for HashedCredentialStore {
    async fn verify(&self, account_id: AccountId, secret: &str) -> AppResult<bool> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {account_id} not found")))?;
        self.hasher.verify_password(secret, &account.password_hash)
    }

    async fn set_credential(&self, account_id: AccountId, secret: &str) -> AppResult<()> {
        let hash = self.hasher.hash_password(secret)?;
        self.accounts.update_password_hash(account_id, &hash).await?;
        debug!(account_id = %account_id, "Credential replaced");
        Ok(())
    }

    async fn simulate_set_credential(&self, secret: &str) -> AppResult<()> {
        self.hasher.hash_password(secret).map(|_| ())
    }
}
