//! Issues single-use temporary passwords.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{info, warn};

use bookhub_cache::TemporaryCredentialCache;
use bookhub_core::config::EmailConfig;
use bookhub_core::error::{AppError, ErrorKind};
use bookhub_core::result::AppResult;
use bookhub_core::traits::{CredentialStore, Mailer};
use bookhub_core::types::AccountId;
use bookhub_entity::account::Account;

use crate::credential::CredentialLocks;
use crate::password::SecretGenerator;

/// Subject line of the temporary password email.
pub const TEMPORARY_PASSWORD_SUBJECT: &str = "Your Temporary Password";

/// A generated temporary password. Never printed by `Debug`.
#[derive(Clone)]
pub struct TemporarySecret(SecretString);

impl TemporarySecret {
    /// Wraps an existing secret.
    pub fn new(secret: SecretString) -> Self {
        Self(secret)
    }

    /// The plaintext.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Unwraps the inner secret.
    pub fn into_inner(self) -> SecretString {
        self.0
    }
}

impl fmt::Debug for TemporarySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemporarySecret([REDACTED])")
    }
}

/// Result of a successful issuance. Carries no secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueReceipt {
    /// Account the secret was issued for.
    pub account_id: AccountId,
    /// Last instant at which the secret can be redeemed.
    pub expires_at: DateTime<Utc>,
}

/// Generates a temporary password, installs it as the account's credential,
/// registers it for one-time redemption and emails it.
#[derive(Debug, Clone)]
pub struct TemporaryCredentialIssuer {
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<TemporaryCredentialCache>,
    mailer: Arc<dyn Mailer>,
    generator: SecretGenerator,
    email: EmailConfig,
    locks: Arc<CredentialLocks>,
}

impl TemporaryCredentialIssuer {
    /// Creates an issuer.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<TemporaryCredentialCache>,
        mailer: Arc<dyn Mailer>,
        generator: SecretGenerator,
        email: EmailConfig,
        locks: Arc<CredentialLocks>,
    ) -> Self {
        Self {
            credentials,
            cache,
            mailer,
            generator,
            email,
            locks,
        }
    }

    /// Issues a temporary password for `account`.
    ///
    /// If installing the credential fails nothing is cached and nothing is
    /// sent. If only the email fails, a `Delivery` error is returned while the
    /// credential stays installed and the cache entry stays redeemable.
    pub async fn issue(&self, account: &Account) -> AppResult<IssueReceipt> {
        let secret = self.generator.generate();
        let body = SecretString::from(compose_body(
            &account.display_name(),
            secret.expose(),
            self.cache.ttl(),
            &self.email.from_name,
        ));

        let expires_at = {
            let _guard = self.locks.acquire(account.id).await;
            self.credentials
                .set_credential(account.id, secret.expose())
                .await?;
            self.cache.register(&account.email, secret.into_inner())
        };

        if let Err(err) = self
            .mailer
            .send(
                account.email.as_str(),
                TEMPORARY_PASSWORD_SUBJECT,
                body.expose_secret(),
            )
            .await
        {
            warn!(
                account_id = %account.id,
                error = %err,
                "Temporary password installed but email delivery failed"
            );
            return Err(AppError::with_source(
                ErrorKind::Delivery,
                format!(
                    "Temporary password for account {} could not be emailed (credential_installed = true)",
                    account.id
                ),
                err,
            ));
        }

        info!(
            account_id = %account.id,
            expires_at = %expires_at,
            "Temporary password issued"
        );

        Ok(IssueReceipt {
            account_id: account.id,
            expires_at,
        })
    }

    /// Spends the generation and hashing work of an issuance without touching
    /// any account, cache entry or mailbox.
    ///
    /// Used for forgot-password requests naming an unknown email, so both
    /// branches cost about the same.
    pub async fn simulate_issue(&self) -> AppResult<()> {
        let secret = self.generator.generate();
        let _body = SecretString::from(compose_body(
            "",
            secret.expose(),
            self.cache.ttl(),
            &self.email.from_name,
        ));
        self.credentials
            .simulate_set_credential(secret.expose())
            .await
    }
}

fn compose_body(name: &str, secret: &str, ttl: Duration, sender: &str) -> String {
    format!(
        "Hello {name},\n\n\
         Your temporary password is: {secret}\n\n\
         It is valid for {window}. Sign in with it and choose a new password.\n\n\
         The {sender} team\n",
        window = describe_window(ttl),
    )
}

fn describe_window(ttl: Duration) -> String {
    let minutes = ttl.num_minutes();
    if minutes >= 1 && ttl.num_seconds() % 60 == 0 {
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else {
        format!("{} seconds", ttl.num_seconds())
    }
}
