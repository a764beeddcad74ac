//! In-memory store implementations.

pub mod account;
pub mod authorization;

pub use account::MemoryAccountRepository;
pub use authorization::MemoryAuthorizationStore;
