//! Identity token creation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use bookhub_core::config::AuthConfig;
use bookhub_core::error::AppError;
use bookhub_core::traits::Clock;
use bookhub_core::types::SessionId;
use bookhub_entity::account::Account;
use bookhub_entity::permission::AuthorizationRecord;

use super::claims::IdentityClaims;

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Signed claims.
    pub claims: IdentityClaims,
}

impl IssuedToken {
    /// Expiration of the token.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// Creates HS256-signed identity tokens.
#[derive(Clone)]
pub struct IdentityTokenEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime.
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for IdentityTokenEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityTokenEncoder")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl IdentityTokenEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            ttl: config.token_ttl()?,
            clock,
        })
    }

    /// Signs a token for `account` carrying its current role and claims.
    pub fn issue(
        &self,
        account: &Account,
        record: &AuthorizationRecord,
    ) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let exp = now + self.ttl;

        let claims = IdentityClaims {
            sub: account.id,
            sid: SessionId::new(),
            email: account.email.to_string(),
            role: record.role,
            perms: record.permissions.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode identity token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }
}
