//! Account repository contract.

use async_trait::async_trait;

use bookhub_core::result::AppResult;
use bookhub_core::types::{AccountId, Email};
use bookhub_entity::account::Account;

/// Persistence of account rows.
#[async_trait]
pub trait AccountRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>>;

    /// Find an account by (normalized) email.
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<Account>>;

    /// Insert a new account. Fails with `Conflict` if the email is taken.
    async fn create(&self, account: Account) -> AppResult<Account>;

    /// Replace the stored password hash. Fails with `NotFound` for an
    /// unknown account.
    async fn update_password_hash(&self, id: AccountId, password_hash: &str) -> AppResult<()>;

    /// Remove an account row and its email index entry. Returns the removed
    /// row; fails with `NotFound` for an unknown account.
    async fn delete(&self, id: AccountId) -> AppResult<Account>;

    /// All accounts ordered by email.
    async fn list(&self) -> AppResult<Vec<Account>>;
}
