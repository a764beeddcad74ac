//! The authentication gate.
//!
//! A login first tries to redeem a pending temporary password; whatever the
//! result of that attempt, a login that did not redeem falls through to the
//! permanent credential. Every rejection looks the same from outside.

use std::sync::Arc;

use tracing::{debug, info, warn};

use bookhub_cache::TemporaryCredentialCache;
use bookhub_core::error::{AppError, ErrorKind, FieldError};
use bookhub_core::result::AppResult;
use bookhub_core::traits::CredentialStore;
use bookhub_core::types::Email;
use bookhub_database::{AccountRepository, AuthorizationStore};
use bookhub_entity::account::Account;

use crate::credential::CredentialLocks;
use crate::password::PasswordHasher;
use crate::token::IdentityTokenEncoder;

use super::session::{AuthMethod, AuthOutcome, AuthenticatedSession};

/// Decides whether an email/secret pair identifies an account.
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    accounts: Arc<dyn AccountRepository>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<TemporaryCredentialCache>,
    authorization: Arc<dyn AuthorizationStore>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<IdentityTokenEncoder>,
    locks: Arc<CredentialLocks>,
}

impl AuthenticationGate {
    /// Creates a gate.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<TemporaryCredentialCache>,
        authorization: Arc<dyn AuthorizationStore>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<IdentityTokenEncoder>,
        locks: Arc<CredentialLocks>,
    ) -> Self {
        Self {
            accounts,
            credentials,
            cache,
            authorization,
            hasher,
            tokens,
            locks,
        }
    }

    /// Authenticates `email` with `supplied`.
    ///
    /// Empty input is a `Validation` error. Unknown accounts, wrong secrets
    /// and expired temporary passwords all produce [`AuthOutcome::Failure`].
    pub async fn authenticate(&self, email: &str, supplied: &str) -> AppResult<AuthOutcome> {
        let email = validate_input(email, supplied)?;

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            self.hasher.verify_dummy(supplied);
            debug!("Login rejected: no such account");
            return Ok(AuthOutcome::Failure);
        };

        // Redemption and rotation form one step with respect to other
        // credential changes of this account.
        let guard = self.locks.acquire(account.id).await;
        match self.cache.redeem(&email, supplied).check() {
            Ok(issued_at) => {
                self.credentials
                    .set_credential(account.id, supplied)
                    .await
                    .map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Internal,
                            format!(
                                "Failed to rotate credential of account {} after redemption",
                                account.id
                            ),
                            e,
                        )
                    })?;
                drop(guard);
                info!(
                    account_id = %account.id,
                    issued_at = %issued_at,
                    "Temporary password redeemed"
                );
                return self
                    .establish(&account, AuthMethod::TemporaryCredential)
                    .await;
            }
            Err(e) if e.is(ErrorKind::ExpiredCredential) => {
                debug!(account_id = %account.id, reason = %e, "Trying permanent credential");
            }
            Err(_) => {}
        }
        drop(guard);

        match self.credentials.verify(account.id, supplied).await {
            Ok(true) => self.establish(&account, AuthMethod::Password).await,
            Ok(false) => {
                debug!(account_id = %account.id, "Login rejected: wrong password");
                Ok(AuthOutcome::Failure)
            }
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(account_id = %account.id, "Account vanished during login");
                Ok(AuthOutcome::Failure)
            }
            Err(e) => Err(e),
        }
    }

    async fn establish(&self, account: &Account, method: AuthMethod) -> AppResult<AuthOutcome> {
        let record = self.authorization.record(account.id).await?;
        let issued = self.tokens.issue(account, &record)?;

        info!(
            account_id = %account.id,
            session_id = %issued.claims.sid,
            method = ?method,
            "Signed in"
        );

        Ok(AuthOutcome::Success(Box::new(AuthenticatedSession {
            account_id: account.id,
            session_id: issued.claims.sid,
            email: account.email.clone(),
            role: record.role,
            permissions: record.permissions,
            method,
            expires_at: issued.expires_at(),
            identity_token: issued.token,
            must_change_password: method == AuthMethod::TemporaryCredential,
        })))
    }
}

fn validate_input(email: &str, supplied: &str) -> AppResult<Email> {
    let mut fields = Vec::new();
    if email.trim().is_empty() {
        fields.push(FieldError::new("email", "Email is required"));
    }
    if supplied.is_empty() {
        fields.push(FieldError::new("password", "Password is required"));
    }
    if !fields.is_empty() {
        return Err(AppError::invalid_fields(fields));
    }
    Email::parse(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::HashedCredentialStore;
    use crate::password::hasher::test_config;
    use bookhub_core::traits::{Clock, ManualClock};
    use bookhub_database::{MemoryAccountRepository, MemoryAuthorizationStore};
    use bookhub_entity::account::NewAccount;
    use chrono::Duration;
    use secrecy::SecretString;

    struct Fixture {
        clock: Arc<ManualClock>,
        cache: Arc<TemporaryCredentialCache>,
        credentials: Arc<HashedCredentialStore>,
        gate: AuthenticationGate,
        account: Account,
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let config = test_config();
        let hasher = Arc::new(PasswordHasher::new(&config).unwrap());
        let accounts = Arc::new(MemoryAccountRepository::new(clock.clone()));
        let account = accounts
            .create(
                NewAccount {
                    email: Email::parse("reader@example.com").unwrap(),
                    first_name: "Rea".into(),
                    last_name: "Der".into(),
                    password_hash: hasher.hash_password("Original#1").unwrap(),
                }
                .into_account(clock.now()),
            )
            .await
            .unwrap();
        let credentials = Arc::new(HashedCredentialStore::new(accounts.clone(), hasher.clone()));
        let cache = Arc::new(TemporaryCredentialCache::new(clock.clone(), Duration::minutes(5)));
        let gate = AuthenticationGate::new(
            accounts,
            credentials.clone(),
            cache.clone(),
            Arc::new(MemoryAuthorizationStore::new()),
            hasher,
            Arc::new(IdentityTokenEncoder::new(&config, clock.clone()).unwrap()),
            Arc::new(CredentialLocks::new()),
        );
        Fixture {
            clock,
            cache,
            credentials,
            gate,
            account,
        }
    }

    async fn issue(f: &Fixture, secret: &str) {
        f.credentials
            .set_credential(f.account.id, secret)
            .await
            .unwrap();
        f.cache
            .register(&f.account.email, SecretString::from(secret.to_string()));
    }

    #[tokio::test]
    async fn test_empty_input_is_validation_error() {
        let f = fixture().await;
        let err = f.gate.authenticate(" ", "").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["email", "password"]);
    }

    #[tokio::test]
    async fn test_permanent_password() {
        let f = fixture().await;
        let outcome = f.gate.authenticate("READER@example.com", "Original#1").await.unwrap();
        let session = outcome.session().unwrap();
        assert_eq!(session.method, AuthMethod::Password);
        assert!(!session.must_change_password);

        let outcome = f.gate.authenticate("reader@example.com", "nope").await.unwrap();
        assert_eq!(outcome.failure_message(), Some("Invalid login attempt."));
    }

    #[tokio::test]
    async fn test_unknown_account_fails_generically() {
        let f = fixture().await;
        let outcome = f.gate.authenticate("ghost@example.com", "whatever").await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.into_result().unwrap_err().user_message(),
            "Invalid login attempt."
        );
    }

    #[tokio::test]
    async fn test_redemption_then_standard_path() {
        let f = fixture().await;
        issue(&f, "Tmp#Abc1").await;

        let first = f.gate.authenticate("reader@example.com", "Tmp#Abc1").await.unwrap();
        let first = first.session().unwrap();
        assert_eq!(first.method, AuthMethod::TemporaryCredential);
        assert!(first.must_change_password);
        assert!(!f.cache.is_pending(&f.account.email));

        let second = f.gate.authenticate("reader@example.com", "Tmp#Abc1").await.unwrap();
        assert_eq!(second.session().unwrap().method, AuthMethod::Password);

        let old = f.gate.authenticate("reader@example.com", "Original#1").await.unwrap();
        assert!(!old.is_success());
    }

    #[tokio::test]
    async fn test_expired_entry_falls_through() {
        let f = fixture().await;
        issue(&f, "Tmp#Abc1").await;
        f.clock.advance(Duration::minutes(5) + Duration::seconds(1));

        let outcome = f.gate.authenticate("reader@example.com", "Tmp#Abc1").await.unwrap();
        assert_eq!(outcome.session().unwrap().method, AuthMethod::Password);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_mismatch_keeps_entry() {
        let f = fixture().await;
        issue(&f, "Tmp#Abc1").await;

        let outcome = f.gate.authenticate("reader@example.com", "Tmp#Zzz9").await.unwrap();
        assert!(!outcome.is_success());
        assert!(f.cache.is_pending(&f.account.email));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_redeem_once() {
        let f = fixture().await;
        issue(&f, "Tmp#Race1").await;
        let gate = Arc::new(f.gate.clone());

        let attempts = (0..8).map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.authenticate("reader@example.com", "Tmp#Race1").await })
        });
        let outcomes: Vec<AuthOutcome> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        let redeemed = outcomes
            .iter()
            .filter_map(AuthOutcome::session)
            .filter(|s| s.method == AuthMethod::TemporaryCredential)
            .count();
        assert_eq!(redeemed, 1);
        assert!(outcomes.iter().all(AuthOutcome::is_success));
    }
}
