//! # bookhub-database
//!
//! Storage contracts for accounts and the role/claim relations, plus
//! in-memory implementations used by the binary and the test suites.
//!
//! Durable storage is provided by the embedding application; this crate
//! only fixes the operations the credential and authorization core issues.

pub mod memory;
pub mod repositories;

pub use memory::{MemoryAccountRepository, MemoryAuthorizationStore};
pub use repositories::{AccountRepository, AuthorizationStore, AuthorizationTransaction};
