//! Temporary credential cache.

pub mod store;

pub use store::{Redemption, TemporaryCredentialCache};
