//! Permanent credential store contract.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::AccountId;

/// Holds the permanent credential verifier of every account.
///
/// Implementations own the hashing scheme. `verify` must not leak through
/// timing how much of the secret matched.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Checks `secret` against the account's current verifier.
    ///
    /// Returns `Ok(false)` for a wrong secret and `NotFound` for an unknown
    /// account.
    async fn verify(&self, account_id: AccountId, secret: &str) -> AppResult<bool>;

    /// Replaces the account's verifier with one derived from `secret`.
    async fn set_credential(&self, account_id: AccountId, secret: &str) -> AppResult<()>;

    /// Does the same derivation work as `set_credential` and discards the
    /// result.
    ///
    /// Flows that must not reveal whether an account exists call this on the
    /// unknown-account branch.
    async fn simulate_set_credential(&self, secret: &str) -> AppResult<()>;
}
