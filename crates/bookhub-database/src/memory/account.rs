//! In-memory account repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::traits::{Clock, SystemClock};
use bookhub_core::types::{AccountId, Email};
use bookhub_entity::account::Account;

use crate::repositories::AccountRepository;

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
    by_email: HashMap<Email, AccountId>,
}

/// Account rows held in a process-local map.
///
/// The email index lives under the same lock as the rows, so uniqueness is
/// checked and claimed in one step.
#[derive(Debug)]
pub struct MemoryAccountRepository {
    inner: RwLock<Accounts>,
    /// Stamps `updated_at` on writes.
    clock: Arc<dyn Clock>,
}

impl MemoryAccountRepository {
    /// Create an empty repository using `clock` for modification stamps.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(Accounts::default()),
            clock,
        }
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn create(&self, account: Account) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&account.email) {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                account.email
            )));
        }
        inner.by_email.insert(account.email.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());
        debug!(account_id = %account.id, "Account row inserted");
        Ok(account)
    }

    async fn update_password_hash(&self, id: AccountId, password_hash: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;
        account.password_hash = password_hash.to_string();
        account.updated_at = self.clock.now();
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> AppResult<Account> {
        let mut inner = self.inner.write().await;
        let account = inner
            .by_id
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;
        inner.by_email.remove(&account.email);
        debug!(account_id = %id, "Account row deleted");
        Ok(account)
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<Account> = inner.by_id.values().cloned().collect();
        accounts.sort_by(|a, b| a.email.as_str().cmp(b.email.as_str()));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookhub_core::ErrorKind;
    use bookhub_core::traits::ManualClock;
    use bookhub_entity::account::NewAccount;

    fn new_account(email: &str, now: chrono::DateTime<chrono::Utc>) -> Account {
        NewAccount {
            email: Email::parse(email).unwrap(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_hash: "hash-0".into(),
        }
        .into_account(now)
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let clock = Arc::new(ManualClock::default());
        let repo = MemoryAccountRepository::new(clock.clone());
        let created = repo
            .create(new_account("Reader@Example.com", clock.now()))
            .await
            .unwrap();

        let found = repo
            .find_by_email(&Email::parse("reader@EXAMPLE.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_id(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let clock = Arc::new(ManualClock::default());
        let repo = MemoryAccountRepository::new(clock.clone());
        repo.create(new_account("dup@example.com", clock.now()))
            .await
            .unwrap();

        let err = repo
            .create(new_account("DUP@example.com", clock.now()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_password_hash_stamps_time() {
        let clock = Arc::new(ManualClock::default());
        let repo = MemoryAccountRepository::new(clock.clone());
        let created = repo
            .create(new_account("a@example.com", clock.now()))
            .await
            .unwrap();

        clock.advance(chrono::Duration::minutes(1));
        repo.update_password_hash(created.id, "hash-1").await.unwrap();

        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "hash-1");
        assert!(stored.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_account_is_not_found() {
        let repo = MemoryAccountRepository::default();
        let err = repo
            .update_password_hash(AccountId::new(), "hash")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_frees_the_email() {
        let clock = Arc::new(ManualClock::default());
        let repo = MemoryAccountRepository::new(clock.clone());
        let created = repo
            .create(new_account("gone@example.com", clock.now()))
            .await
            .unwrap();

        let removed = repo.delete(created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
        assert!(repo
            .find_by_email(&Email::parse("gone@example.com").unwrap())
            .await
            .unwrap()
            .is_none());

        let err = repo.delete(created.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        repo.create(new_account("gone@example.com", clock.now()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_email() {
        let clock = Arc::new(ManualClock::default());
        let repo = MemoryAccountRepository::new(clock.clone());
        for email in ["c@example.com", "a@example.com", "b@example.com"] {
            repo.create(new_account(email, clock.now())).await.unwrap();
        }
        let emails: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.email.to_string())
            .collect();
        assert_eq!(emails, ["a@example.com", "b@example.com", "c@example.com"]);
    }
}
