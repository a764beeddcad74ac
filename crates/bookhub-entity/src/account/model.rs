//! Account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookhub_core::types::{AccountId, Email};

/// A registered account.
///
/// The password hash is owned by the credential store and is skipped when
/// the account is serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable unique identifier.
    pub id: AccountId,
    /// Unique, case-insensitive email.
    pub email: Email,
    /// Login/display name. Registration uses the email.
    pub user_name: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Permanent credential verifier (PHC string).
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Full name for greetings, falling back to the user name.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.user_name.clone()
        } else {
            full.to_string()
        }
    }
}

/// Data required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Email address.
    pub email: Email,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Already hashed password.
    pub password_hash: String,
}

impl NewAccount {
    /// Builds the account row with a fresh identifier.
    pub fn into_account(self, now: DateTime<Utc>) -> Account {
        Account {
            id: AccountId::new(),
            user_name: self.email.as_str().to_string(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
