//! Unified application error types for BookHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The kind decides what may be shown to
//! an end user: see [`AppError::user_message`].

use std::fmt;
use thiserror::Error;

/// Generic message for every failed login, whatever the cause.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid login attempt.";

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested account or resource was not found.
    NotFound,
    /// Authentication failed. Always rendered with the generic login message.
    Authentication,
    /// A temporary credential was present but past its TTL.
    ExpiredCredential,
    /// The actor is not allowed to perform the action.
    Authorization,
    /// Input validation failed; field details are safe to disclose.
    Validation,
    /// A conflict occurred (duplicate email, etc.).
    Conflict,
    /// A multi-step mutation stopped half way.
    PartialFailure,
    /// Email delivery failed.
    Delivery,
    /// An internal error occurred.
    Internal,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::ExpiredCredential => write!(f, "EXPIRED_CREDENTIAL"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::PartialFailure => write!(f, "PARTIAL_FAILURE"),
            Self::Delivery => write!(f, "DELIVERY"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// A validation problem attached to a single input field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The unified application error used throughout BookHub.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A message for logs and operators.
    pub message: String,
    /// Field-level details for validation errors.
    pub fields: Vec<FieldError>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Vec::new(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Vec::new(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create the generic authentication failure.
    pub fn invalid_login() -> Self {
        Self::new(ErrorKind::Authentication, INVALID_LOGIN_MESSAGE)
    }

    /// Create an authentication error with an operator-facing message.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an expired-credential error.
    pub fn expired_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredCredential, message)
    }

    /// Create an authorization (permission) error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error without field details.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a validation error for a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = FieldError::new(field, message);
        Self {
            kind: ErrorKind::Validation,
            message: format!("{}: {}", field.field, field.message),
            fields: vec![field],
            source: None,
        }
    }

    /// Create a validation error carrying several field errors.
    pub fn invalid_fields(fields: Vec<FieldError>) -> Self {
        let message = fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            kind: ErrorKind::Validation,
            message,
            fields,
            source: None,
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a partial-failure error.
    pub fn partial_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PartialFailure, message)
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delivery, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns `true` if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Text that is safe to show to an end user.
    ///
    /// Authentication-related kinds collapse into the same generic message so
    /// that unknown accounts, wrong passwords and expired temporary passwords
    /// are indistinguishable.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::NotFound | ErrorKind::Authentication | ErrorKind::ExpiredCredential => {
                INVALID_LOGIN_MESSAGE.to_string()
            }
            ErrorKind::Validation | ErrorKind::Authorization | ErrorKind::Conflict => {
                self.message.clone()
            }
            ErrorKind::Delivery => "Could not send email, please try again later.".to_string(),
            _ => "Something went wrong, please try again later.".to_string(),
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            fields: self.fields.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = Vec::new();
        for (field, errors) in err.field_errors() {
            for e in errors.iter() {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                fields.push(FieldError::new(field.to_string(), message));
            }
        }
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::invalid_fields(fields)
    }
}
