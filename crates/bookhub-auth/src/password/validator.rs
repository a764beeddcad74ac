//! Password policy enforcement for user-chosen passwords.

use bookhub_core::config::AuthConfig;
use bookhub_core::error::AppError;

/// Validates password strength against configured policies.
///
/// Applied on registration and password change. Generated temporary
/// secrets are not subject to it.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates `password` submitted in `field`.
    ///
    /// `user_inputs` (email, names) are penalized by the strength estimate.
    /// Returns the first violation found.
    pub fn validate(
        &self,
        field: &str,
        password: &str,
        user_inputs: &[&str],
    ) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::invalid_field(
                field,
                format!(
                    "Password must be at least {} characters long",
                    self.min_length
                ),
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::invalid_field(
                field,
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::invalid_field(
                field,
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::invalid_field(
                field,
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::invalid_field(
                field,
                "Password must contain at least one special character",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if estimate.score() < zxcvbn::Score::Three {
            return Err(AppError::invalid_field(
                field,
                "Password is too weak. Please use a stronger password with more entropy.",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::invalid_field(
                "new_password",
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
