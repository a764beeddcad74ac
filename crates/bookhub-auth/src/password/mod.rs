//! Password hashing, policy enforcement and temporary secret generation.

pub mod generator;
pub mod hasher;
pub mod validator;

pub use generator::SecretGenerator;
pub use hasher::PasswordHasher;
pub use validator::PasswordValidator;
