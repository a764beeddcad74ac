//! Temporary (forgot-password) credential entry.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// A short-lived, single-use secret registered for one account.
///
/// `expires_at` is always `issued_at + ttl`. The entry is live up to and
/// including `expires_at`.
#[derive(Clone)]
pub struct TemporaryCredentialEntry {
    secret: SecretString,
    /// When the secret was issued.
    pub issued_at: DateTime<Utc>,
    /// Last instant at which the secret may be redeemed.
    pub expires_at: DateTime<Utc>,
}

impl TemporaryCredentialEntry {
    /// Creates an entry issued at `issued_at` that lives for `ttl`.
    pub fn new(secret: SecretString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            secret,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Whether the entry is past its TTL at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// The plaintext secret.
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl std::fmt::Debug for TemporaryCredentialEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentialEntry")
            .field("secret", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
