//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional default TOML file, an environment overlay, and `BOOKHUB__*`
//! environment variables. Every field has a serde default so an empty
//! configuration is valid.

pub mod auth;
pub mod email;
pub mod logging;
pub mod seed;
pub mod temporary;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::email::EmailConfig;
pub use self::logging::LoggingConfig;
pub use self::seed::SeedConfig;
pub use self::temporary::TemporaryCredentialConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Temporary credential settings.
    #[serde(default)]
    pub temporary_credential: TemporaryCredentialConfig,
    /// Outgoing email settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// Initial accounts created by the seeder.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `{dir}/default.toml`, `{dir}/{env}.toml` and environment
    /// variables prefixed with `BOOKHUB__` (e.g. `BOOKHUB__AUTH__TOKEN_SECRET`).
    /// Missing files are skipped.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BOOKHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.token_ttl()?;
        self.temporary_credential.ttl()?;
        Ok(())
    }

    /// Returns a copy with every secret replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.auth.token_secret = REDACTED.to_string();
        copy.seed.admin_password = REDACTED.to_string();
        copy.seed.staff_password = REDACTED.to_string();
        copy
    }
}

const REDACTED: &str = "********";

/// Converts a configured amount into a non-zero duration, rejecting values
/// that overflow `i64` or chrono's range.
fn positive_duration(
    field: &str,
    amount: u64,
    unit: fn(i64) -> Option<chrono::Duration>,
) -> Result<chrono::Duration, AppError> {
    if amount == 0 {
        return Err(AppError::configuration(format!("{field} must be greater than zero")));
    }
    i64::try_from(amount)
        .ok()
        .and_then(unit)
        .ok_or_else(|| AppError::configuration(format!("{field} is out of range: {amount}")))
}
