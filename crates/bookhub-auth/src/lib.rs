//! # bookhub-auth
//!
//! Credential and authorization core of BookHub.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing, password policy, temporary secret generation
//! - `credential` — hash-backed [`CredentialStore`](bookhub_core::traits::CredentialStore)
//! - `temporary` — issuance of single-use temporary passwords
//! - `gate` — authentication gate (temporary redemption, then standard verification)
//! - `token` — identity token creation, validation and revocation
//! - `rbac` — role defaults and route-level role checks
//! - `authorization` — effective permissions and atomic role/claim replacement

pub mod authorization;
pub mod credential;
pub mod gate;
pub mod password;
pub mod rbac;
pub mod temporary;
pub mod token;

pub use authorization::{AuthorizationModel, PermissionDrift, RoleAdministrator};
pub use credential::{CredentialLocks, HashedCredentialStore};
pub use gate::{AuthMethod, AuthOutcome, AuthenticatedSession, AuthenticationGate};
pub use password::{PasswordHasher, PasswordValidator, SecretGenerator};
pub use rbac::{RoleGate, RolePolicies};
pub use temporary::{IssueReceipt, TemporaryCredentialIssuer, TemporarySecret};
pub use token::{IdentityClaims, IdentityTokenDecoder, IdentityTokenEncoder};
