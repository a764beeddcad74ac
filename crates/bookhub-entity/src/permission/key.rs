//! The closed permission catalog.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use bookhub_core::{AppError, FieldError};

/// A fine-grained capability that can be granted to an account.
///
/// Keys are serialized in their dotted form (`Book.Create`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PermissionKey {
    /// Create catalog entries.
    BookCreate,
    /// View catalog entries.
    BookView,
    /// Edit catalog entries.
    BookUpdate,
    /// Remove catalog entries.
    BookDelete,
    /// View orders.
    OrderView,
    /// Change order status.
    OrderUpdate,
    /// View user accounts.
    UserView,
    /// Edit user profiles.
    UserEdit,
    /// Delete user accounts.
    UserDelete,
    /// Change roles and permissions of other users.
    UserManage,
}

impl PermissionKey {
    /// The full catalog in display order.
    pub const ALL: [PermissionKey; 10] = [
        PermissionKey::BookCreate,
        PermissionKey::BookView,
        PermissionKey::BookUpdate,
        PermissionKey::BookDelete,
        PermissionKey::OrderView,
        PermissionKey::OrderUpdate,
        PermissionKey::UserView,
        PermissionKey::UserEdit,
        PermissionKey::UserDelete,
        PermissionKey::UserManage,
    ];

    /// The dotted key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookCreate => "Book.Create",
            Self::BookView => "Book.View",
            Self::BookUpdate => "Book.Update",
            Self::BookDelete => "Book.Delete",
            Self::OrderView => "Order.View",
            Self::OrderUpdate => "Order.Update",
            Self::UserView => "User.View",
            Self::UserEdit => "User.Edit",
            Self::UserDelete => "User.Delete",
            Self::UserManage => "User.Manage",
        }
    }

    /// Resource part of the key (`Book`, `Order`, `User`).
    pub fn category(&self) -> &'static str {
        self.as_str().split('.').next().unwrap_or_default()
    }

    /// Parses a list of raw keys, rejecting the whole list if any key is not
    /// in the catalog. Duplicates collapse.
    pub fn parse_set<S: AsRef<str>>(raw: &[S]) -> Result<BTreeSet<PermissionKey>, AppError> {
        let mut keys = BTreeSet::new();
        let mut unknown = Vec::new();

        for item in raw {
            match item.as_ref().parse::<PermissionKey>() {
                Ok(key) => {
                    keys.insert(key);
                }
                Err(_) => unknown.push(item.as_ref().to_string()),
            }
        }

        if unknown.is_empty() {
            Ok(keys)
        } else {
            Err(AppError::invalid_fields(vec![FieldError::new(
                "permissions",
                format!("Unknown permission keys: {}", unknown.join(", ")),
            )]))
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `Book.Read` is the name older admin screens used for viewing.
        if s == "Book.Read" {
            return Ok(Self::BookView);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                AppError::invalid_field("permissions", format!("Unknown permission key: '{s}'"))
            })
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_parses_back() {
        for key in PermissionKey::ALL {
            assert_eq!(key.as_str().parse::<PermissionKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_legacy_read_alias() {
        assert_eq!(
            "Book.Read".parse::<PermissionKey>().unwrap(),
            PermissionKey::BookView
        );
    }

    #[test]
    fn test_parse_set_rejects_unknown_keys() {
        let err = PermissionKey::parse_set(&["Book.Create", "Book.Burn", "book.view"]).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert!(err.message.contains("Book.Burn"));
        assert!(err.message.contains("book.view"));
    }

    #[test]
    fn test_parse_set_collapses_duplicates() {
        let set = PermissionKey::parse_set(&["Order.View", "Order.View", "User.Manage"]).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_uses_dotted_form() {
        let json = serde_json::to_string(&PermissionKey::UserManage).unwrap();
        assert_eq!(json, "\"User.Manage\"");
        let back: PermissionKey = serde_json::from_str("\"Order.Update\"").unwrap();
        assert_eq!(back, PermissionKey::OrderUpdate);
        assert!(serde_json::from_str::<PermissionKey>("\"Order.Cancel\"").is_err());
    }
}
