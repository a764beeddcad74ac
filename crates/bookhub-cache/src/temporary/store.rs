//! Temporary credential store backed by a sharded map.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use secrecy::SecretString;
use subtle::ConstantTimeEq;
use tracing::debug;

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::traits::{Clock, ExpiringStore};
use bookhub_core::types::Email;
use bookhub_entity::credential::TemporaryCredentialEntry;

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// A live entry matched and has been removed. Only one caller can ever
    /// observe this for a given issuance.
    Redeemed {
        /// When the redeemed secret was issued.
        issued_at: DateTime<Utc>,
    },
    /// A live entry exists but the supplied secret differs. The entry is kept.
    Mismatch,
    /// The entry was past its TTL and has been removed.
    Expired,
    /// No entry for this account.
    Absent,
}

impl Redemption {
    /// The issue instant of a redeemed secret, or the error kind describing
    /// why nothing was redeemed: `ExpiredCredential`, `Authentication` for a
    /// mismatch, `NotFound` when nothing was pending.
    pub fn check(self) -> AppResult<DateTime<Utc>> {
        match self {
            Self::Redeemed { issued_at } => Ok(issued_at),
            Self::Expired => Err(AppError::expired_credential(
                "Temporary password expired before use",
            )),
            Self::Mismatch => Err(AppError::invalid_login()),
            Self::Absent => Err(AppError::not_found("No pending temporary password")),
        }
    }
}

/// Maps account email to its pending temporary credential.
///
/// Every operation on a key runs under that key's shard write lock, so a
/// lookup, its expiry check and the deletion that follows are one atomic
/// step. Expiry is lazy: an entry past `expires_at` is treated as absent by
/// every reader even before a sweep removes it.
#[derive(Debug)]
pub struct TemporaryCredentialCache {
    /// Pending entries keyed by normalized email.
    entries: DashMap<Email, TemporaryCredentialEntry>,
    /// Time source for expiry checks.
    clock: Arc<dyn Clock>,
    /// Lifetime of each entry.
    ttl: Duration,
}

impl TemporaryCredentialCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            ttl,
        }
    }

    /// Configured entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Registers `secret` for `email`, superseding any previous entry.
    ///
    /// Returns the instant at which the new entry stops being redeemable.
    pub fn register(&self, email: &Email, secret: SecretString) -> DateTime<Utc> {
        let entry = TemporaryCredentialEntry::new(secret, self.clock.now(), self.ttl);
        let expires_at = entry.expires_at;
        if self.entries.insert(email.clone(), entry).is_some() {
            debug!(email = %email, "Superseded pending temporary credential");
        }
        expires_at
    }

    /// Attempts to redeem `supplied` for `email`.
    ///
    /// The comparison runs in constant time with respect to the secret's
    /// contents.
    pub fn redeem(&self, email: &Email, supplied: &str) -> Redemption {
        let now = self.clock.now();
        match self.entries.entry(email.clone()) {
            Entry::Occupied(occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.remove();
                    debug!(email = %email, "Evicted expired temporary credential");
                    return Redemption::Expired;
                }

                let matches: bool = occupied
                    .get()
                    .secret()
                    .as_bytes()
                    .ct_eq(supplied.as_bytes())
                    .into();

                if matches {
                    let entry = occupied.remove();
                    Redemption::Redeemed {
                        issued_at: entry.issued_at,
                    }
                } else {
                    Redemption::Mismatch
                }
            }
            Entry::Vacant(_) => Redemption::Absent,
        }
    }

    /// Whether a live entry exists for `email`. Expired entries found on the
    /// way are removed.
    pub fn is_pending(&self, email: &Email) -> bool {
        let now = self.clock.now();
        match self.entries.entry(email.clone()) {
            Entry::Occupied(occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.remove();
                    false
                } else {
                    true
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Expiry instant of the live entry for `email`, if any.
    pub fn expires_at(&self, email: &Email) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.entries
            .get(email)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at)
    }

    /// Drops the entry for `email`. Returns `true` if one existed.
    pub fn invalidate(&self, email: &Email) -> bool {
        self.entries.remove(email).is_some()
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ExpiringStore for TemporaryCredentialCache {
    fn label(&self) -> &'static str {
        "temporary_credentials"
    }

    fn purge_expired(&self) -> usize {
        TemporaryCredentialCache::purge_expired(self)
    }
}
