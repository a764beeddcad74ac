//! Request and response DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use bookhub_core::types::AccountId;

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address, also used as user name.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Given name.
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Password repeated.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password (permanent or temporary).
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Forgot-password form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email of the account.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Response to a forgot-password request. Identical whether or not the
/// account exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    /// Text shown to the user.
    pub message: String,
}

/// Password change form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
    /// New password repeated.
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Admin edit of a user's role and permissions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditUserRequest {
    /// Account being edited.
    pub user_id: AccountId,
    /// Requested role name.
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    /// Requested permission keys; replaces the current set.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Filter for the user list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    /// Case-insensitive substring of user name or email.
    pub search: Option<String>,
}
