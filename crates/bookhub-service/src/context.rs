//! Request context carrying the authenticated account and its grants.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookhub_auth::token::IdentityClaims;
use bookhub_core::types::{AccountId, SessionId};
use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

/// Context for the current authenticated request.
///
/// Built from a validated identity token and passed into service methods so
/// that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated account.
    pub account_id: AccountId,
    /// The current session.
    pub session_id: SessionId,
    /// Email from the token.
    pub email: String,
    /// Role at the time the token was issued.
    pub role: Option<Role>,
    /// Permission claims at the time the token was issued.
    pub permissions: BTreeSet<PermissionKey>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context from decoded token claims.
    pub fn from_claims(claims: &IdentityClaims, request_time: DateTime<Utc>) -> Self {
        Self {
            account_id: claims.sub,
            session_id: claims.sid,
            email: claims.email.clone(),
            role: claims.role,
            permissions: claims.perms.clone(),
            request_time,
        }
    }
}
