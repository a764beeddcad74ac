//! Repository contracts.

pub mod account;
pub mod authorization;

pub use account::AccountRepository;
pub use authorization::{AuthorizationStore, AuthorizationTransaction};
