//! Account self-service: registration, sign-in, password recovery.

pub mod service;

pub use service::{AccountService, FORGOT_PASSWORD_MESSAGE};
