//! Account self-service operations.

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use bookhub_auth::credential::CredentialLocks;
use bookhub_auth::gate::{AuthenticatedSession, AuthenticationGate};
use bookhub_auth::password::{PasswordHasher, PasswordValidator};
use bookhub_auth::temporary::TemporaryCredentialIssuer;
use bookhub_auth::token::IdentityTokenDecoder;
use bookhub_cache::TemporaryCredentialCache;
use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::traits::{Clock, CredentialStore};
use bookhub_core::types::Email;
use bookhub_database::{AccountRepository, AuthorizationStore};
use bookhub_entity::account::{Account, NewAccount, Role};

use crate::context::RequestContext;
use crate::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    RegisterRequest,
};

/// Shown after every forgot-password request, whether or not the email is
/// known.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If this email exists in our system, a temporary password has been sent.";

/// Handles account self-service operations.
#[derive(Debug, Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    authorization: Arc<dyn AuthorizationStore>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<TemporaryCredentialCache>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    gate: Arc<AuthenticationGate>,
    issuer: Arc<TemporaryCredentialIssuer>,
    tokens: Arc<IdentityTokenDecoder>,
    locks: Arc<CredentialLocks>,
    /// Registrations with this email become administrators.
    admin_email: Option<Email>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Creates a new account service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        authorization: Arc<dyn AuthorizationStore>,
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<TemporaryCredentialCache>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        gate: Arc<AuthenticationGate>,
        issuer: Arc<TemporaryCredentialIssuer>,
        tokens: Arc<IdentityTokenDecoder>,
        locks: Arc<CredentialLocks>,
        admin_email: Option<Email>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            authorization,
            credentials,
            cache,
            hasher,
            validator,
            gate,
            issuer,
            tokens,
            locks,
            admin_email,
            clock,
        }
    }

    /// Registers a new account.
    ///
    /// The configured administrator email receives the Admin role, everyone
    /// else Staff. No permission claims are attached.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Account> {
        req.validate()?;
        let email = Email::parse(&req.email)?;
        self.validator.validate(
            "password",
            &req.password,
            &[email.as_str(), req.first_name.as_str(), req.last_name.as_str()],
        )?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email '{email}' is already registered"
            )));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let account = self
            .accounts
            .create(
                NewAccount {
                    email,
                    first_name: req.first_name.trim().to_string(),
                    last_name: req.last_name.trim().to_string(),
                    password_hash,
                }
                .into_account(self.clock.now()),
            )
            .await?;

        let role = if self.admin_email.as_ref() == Some(&account.email) {
            Role::Admin
        } else {
            Role::Staff
        };
        let mut tx = self.authorization.begin(account.id).await?;
        tx.add_role(role).await?;
        tx.commit().await?;

        info!(account_id = %account.id, role = %role, "Account registered");

        Ok(account)
    }

    /// Signs in with a permanent or temporary password.
    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthenticatedSession> {
        req.validate()?;
        self.gate
            .authenticate(&req.email, &req.password)
            .await?
            .into_result()
    }

    /// Revokes the identity token of the current session.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let claims = self.tokens.decode(token)?;
        self.tokens.revoke(&claims);
        info!(account_id = %claims.sub, session_id = %claims.sid, "Signed out");
        Ok(())
    }

    /// Validates an identity token and builds the request context from it.
    pub fn authorize(&self, token: &str) -> AppResult<RequestContext> {
        let claims = self.tokens.decode(token)?;
        Ok(RequestContext::from_claims(&claims, self.clock.now()))
    }

    /// Sends a temporary password to the account, if it exists.
    ///
    /// The response is the same for known and unknown emails. For an
    /// unknown email the generation and hashing work is still spent so the
    /// two cases take about as long.
    pub async fn forgot_password(
        &self,
        req: ForgotPasswordRequest,
    ) -> AppResult<ForgotPasswordResponse> {
        req.validate()?;
        let email = Email::parse(&req.email)?;

        match self.accounts.find_by_email(&email).await? {
            Some(account) => {
                self.issuer.issue(&account).await?;
            }
            None => {
                self.issuer.simulate_issue().await?;
                debug!("Forgot-password request for unknown email");
            }
        }

        Ok(ForgotPasswordResponse {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
        })
    }

    /// Changes the current account's password.
    ///
    /// Any pending temporary password is invalidated.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        req: ChangePasswordRequest,
    ) -> AppResult<()> {
        req.validate()?;
        let account = self
            .accounts
            .find_by_id(ctx.account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))?;

        let _guard = self.locks.acquire(account.id).await;
        if !self
            .credentials
            .verify(account.id, &req.current_password)
            .await?
        {
            return Err(AppError::invalid_field(
                "current_password",
                "Current password is incorrect",
            ));
        }

        self.validator
            .validate_not_same(&req.current_password, &req.new_password)?;
        self.validator.validate(
            "new_password",
            &req.new_password,
            &[
                account.email.as_str(),
                account.first_name.as_str(),
                account.last_name.as_str(),
            ],
        )?;

        if self.cache.invalidate(&account.email) {
            debug!(account_id = %account.id, "Pending temporary password invalidated");
        }
        self.credentials
            .set_credential(account.id, &req.new_password)
            .await?;

        info!(account_id = %account.id, "Password changed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bookhub_auth::password::SecretGenerator;
    use bookhub_core::config::{AppConfig, AuthConfig, EmailConfig};
    use bookhub_core::traits::{LogMailer, ManualClock};
    use bookhub_core::types::AccountId;

    use crate::app::BookHub;

    /// Delegates to the real store and counts each kind of write.
    #[derive(Debug)]
    struct CountingCredentials {
        inner: Arc<dyn CredentialStore>,
        writes: AtomicUsize,
        simulated: AtomicUsize,
    }

    #[async_trait]
    impl CredentialStore for CountingCredentials {
        async fn verify(&self, account_id: AccountId, secret: &str) -> AppResult<bool> {
            self.inner.verify(account_id, secret).await
        }

        async fn set_credential(&self, account_id: AccountId, secret: &str) -> AppResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set_credential(account_id, secret).await
        }

        async fn simulate_set_credential(&self, secret: &str) -> AppResult<()> {
            self.simulated.fetch_add(1, Ordering::SeqCst);
            self.inner.simulate_set_credential(secret).await
        }
    }

    fn service() -> (Arc<CountingCredentials>, BookHub, AccountService) {
        let config = AppConfig {
            auth: AuthConfig {
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        };
        let app = BookHub::in_memory(
            config.clone(),
            Arc::new(ManualClock::default()),
            Arc::new(LogMailer),
        )
        .unwrap();

        let counting = Arc::new(CountingCredentials {
            inner: app.credentials.clone(),
            writes: AtomicUsize::new(0),
            simulated: AtomicUsize::new(0),
        });
        let locks = Arc::new(CredentialLocks::new());
        let issuer = Arc::new(TemporaryCredentialIssuer::new(
            counting.clone(),
            app.cache.clone(),
            Arc::new(LogMailer),
            SecretGenerator::new(8),
            EmailConfig::default(),
            locks.clone(),
        ));
        let service = AccountService::new(
            app.accounts.clone(),
            app.authorization_store.clone(),
            counting.clone(),
            app.cache.clone(),
            app.hasher.clone(),
            Arc::new(PasswordValidator::new(&config.auth)),
            app.gate.clone(),
            issuer,
            app.tokens.clone(),
            locks,
            None,
            app.clock.clone(),
        );
        (counting, app, service)
    }

    fn forgot(email: &str) -> ForgotPasswordRequest {
        ForgotPasswordRequest {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_email_spends_hashing_work() {
        let (counting, app, service) = service();

        let response = service.forgot_password(forgot("ghost@example.com")).await.unwrap();

        assert_eq!(response.message, FORGOT_PASSWORD_MESSAGE);
        assert_eq!(counting.simulated.load(Ordering::SeqCst), 1);
        assert_eq!(counting.writes.load(Ordering::SeqCst), 0);
        assert!(app.cache.is_empty());
    }

    #[tokio::test]
    async fn test_known_email_writes_instead_of_simulating() {
        let (counting, app, service) = service();
        service
            .register(RegisterRequest {
                email: "reader@example.com".to_string(),
                first_name: "Test".to_string(),
                last_name: "Reader".to_string(),
                password: "Violet#Harbor-Quartz92".to_string(),
                confirm_password: "Violet#Harbor-Quartz92".to_string(),
            })
            .await
            .unwrap();

        let response = service.forgot_password(forgot("reader@example.com")).await.unwrap();

        assert_eq!(response.message, FORGOT_PASSWORD_MESSAGE);
        assert_eq!(counting.writes.load(Ordering::SeqCst), 1);
        assert_eq!(counting.simulated.load(Ordering::SeqCst), 0);
        assert_eq!(app.cache.len(), 1);
    }
}
