//! Fine-grained permission claims.

pub mod key;
pub mod record;

pub use key::PermissionKey;
pub use record::{AuthorizationRecord, CLAIM_TYPE_PERMISSION, PermissionClaim};
