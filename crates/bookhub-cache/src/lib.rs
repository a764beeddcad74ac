//! # bookhub-cache
//!
//! Ephemeral stores for BookHub. The only one today is the temporary
//! credential cache used by the forgot-password flow:
//!
//! - **store**: sharded map keyed by normalized email with lazy TTL expiry
//!   and atomic check-then-delete redemption
//! - **sweeper**: optional background task that evicts expired entries from
//!   any [`ExpiringStore`](bookhub_core::traits::ExpiringStore)
//!
//! The cache is an explicit component handed to its users at construction;
//! there is no global instance.

pub mod sweeper;
pub mod temporary;

pub use sweeper::ExpirySweeper;
pub use temporary::{Redemption, TemporaryCredentialCache};
