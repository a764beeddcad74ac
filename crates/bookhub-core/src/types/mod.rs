//! Shared value types.

pub mod email;
pub mod id;

pub use email::Email;
pub use id::{AccountId, SessionId};
