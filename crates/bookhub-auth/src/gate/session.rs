//! Outcome types of an authentication attempt.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use bookhub_core::error::{AppError, INVALID_LOGIN_MESSAGE};
use bookhub_core::types::{AccountId, Email, SessionId};
use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

/// Which credential satisfied the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// A pending temporary password was redeemed.
    TemporaryCredential,
    /// The permanent password matched.
    Password,
}

/// An established identity session.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession {
    /// Authenticated account.
    pub account_id: AccountId,
    /// Session identifier (the token's `sid`).
    pub session_id: SessionId,
    /// Normalized email.
    pub email: Email,
    /// Role at sign-in.
    pub role: Option<Role>,
    /// Permission claims at sign-in.
    pub permissions: BTreeSet<PermissionKey>,
    /// How the account authenticated.
    pub method: AuthMethod,
    /// Signed identity token.
    pub identity_token: String,
    /// Expiry of the identity token.
    pub expires_at: DateTime<Utc>,
    /// Set after a temporary password was redeemed: the installed value is
    /// still the redeemed one and should be changed.
    pub must_change_password: bool,
}

/// Result of [`AuthenticationGate::authenticate`](super::AuthenticationGate::authenticate).
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Credentials accepted.
    Success(Box<AuthenticatedSession>),
    /// Credentials rejected. Carries no reason by construction.
    Failure,
}

impl AuthOutcome {
    /// Whether authentication succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The session, if any.
    pub fn session(&self) -> Option<&AuthenticatedSession> {
        match self {
            Self::Success(session) => Some(session),
            Self::Failure => None,
        }
    }

    /// Text shown to the user on failure.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) => None,
            Self::Failure => Some(INVALID_LOGIN_MESSAGE),
        }
    }

    /// Converts a failure into the generic authentication error.
    pub fn into_result(self) -> Result<AuthenticatedSession, AppError> {
        match self {
            Self::Success(session) => Ok(*session),
            Self::Failure => Err(AppError::invalid_login()),
        }
    }
}
