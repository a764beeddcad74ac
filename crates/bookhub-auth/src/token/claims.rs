//! Identity token claims.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookhub_core::types::{AccountId, SessionId};
use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

/// JWT claims payload of an identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the account ID.
    pub sub: AccountId,
    /// Session this token belongs to.
    pub sid: SessionId,
    /// Normalized email at issuance.
    pub email: String,
    /// Role at issuance.
    pub role: Option<Role>,
    /// Permission claims at issuance.
    pub perms: BTreeSet<PermissionKey>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID for revocation tracking.
    pub jti: Uuid,
}

impl IdentityClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
