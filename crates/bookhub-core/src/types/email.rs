//! Case-insensitive email address.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An email address normalized to trimmed lowercase.
///
/// Two addresses differing only in case or surrounding whitespace compare
/// equal, which makes the type usable directly as a lookup and cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    ///
    /// Only a structural check is performed: one `@`, a non-empty local part,
    /// a domain containing a dot, and no whitespace.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::invalid_field("email", "Email is required"));
        }

        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !normalized.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if !valid {
            return Err(AppError::invalid_field("email", "Invalid email format"));
        }

        Ok(Self(normalized))
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let a = Email::parse("  U@Example.COM ").unwrap();
        let b = Email::parse("u@example.com").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "u@example.com");
    }

    #[test]
    fn test_rejects_empty_with_field_detail() {
        let err = Email::parse("   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.fields[0].field, "email");
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["plain", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com"] {
            assert!(Email::parse(raw).is_err(), "{raw} should be rejected");
        }
    }
}
