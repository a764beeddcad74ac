//! # bookhub-core
//!
//! Core crate for BookHub. Contains the collaborator traits the credential
//! and authorization core is written against (credential store, mailer,
//! clock), configuration schemas, typed identifiers, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other BookHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind, FieldError};
pub use result::AppResult;
