//! Permanent credential storage.

pub mod lock;
pub mod store;

pub use lock::CredentialLocks;
pub use store::HashedCredentialStore;
