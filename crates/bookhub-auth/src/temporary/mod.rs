//! Forgot-password temporary credentials.

pub mod issuer;

pub use issuer::{IssueReceipt, TEMPORARY_PASSWORD_SUBJECT, TemporaryCredentialIssuer, TemporarySecret};
