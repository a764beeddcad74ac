//! Identity token validation and revocation.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;
use uuid::Uuid;

use bookhub_core::config::AuthConfig;
use bookhub_core::error::AppError;
use bookhub_core::traits::{Clock, ExpiringStore};

use super::claims::IdentityClaims;

/// Validates identity tokens against the signing key, the injected clock
/// and a revocation list.
#[derive(Clone)]
pub struct IdentityTokenDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature and claim checks. Expiry is checked against `clock` instead.
    validation: Validation,
    clock: Arc<dyn Clock>,
    /// Revoked token IDs mapped to their expiry timestamp.
    revoked: Arc<DashMap<Uuid, i64>>,
}

impl std::fmt::Debug for IdentityTokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityTokenDecoder")
            .field("validation", &self.validation)
            .field("revoked", &self.revoked.len())
            .finish()
    }
}

impl IdentityTokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
            clock,
            revoked: Arc::new(DashMap::new()),
        }
    }

    /// Decodes and validates a token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration against the injected clock
    /// 3. JTI not revoked
    pub fn decode(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            })?;
        let claims = token_data.claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(AppError::authentication("Token has expired"));
        }
        if self.revoked.contains_key(&claims.jti) {
            return Err(AppError::authentication("Token has been revoked"));
        }

        Ok(claims)
    }

    /// Revokes the token described by `claims` until it would have expired.
    pub fn revoke(&self, claims: &IdentityClaims) {
        self.revoked.insert(claims.jti, claims.exp);
        debug!(jti = %claims.jti, account_id = %claims.sub, "Identity token revoked");
    }

    /// Forgets revocations of tokens that have expired anyway. Returns how
    /// many were dropped.
    pub fn purge_revoked(&self) -> usize {
        let now = self.clock.now().timestamp();
        let before = self.revoked.len();
        self.revoked.retain(|_, exp| *exp > now);
        before.saturating_sub(self.revoked.len())
    }

    /// Number of revocations currently held.
    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }
}

impl ExpiringStore for IdentityTokenDecoder {
    fn label(&self) -> &'static str {
        "revoked_tokens"
    }

    fn purge_expired(&self) -> usize {
        self.purge_revoked()
    }
}
