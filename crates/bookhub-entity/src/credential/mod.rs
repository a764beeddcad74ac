//! Credential-related entities.

pub mod temporary;

pub use temporary::TemporaryCredentialEntry;
