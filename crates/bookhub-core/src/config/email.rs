//! Outgoing email configuration.

use serde::{Deserialize, Serialize};

/// Sender identity for transactional email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Envelope/From address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Display name shown next to the From address.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            from_name: default_from_name(),
        }
    }
}

fn default_from_address() -> String {
    "no-reply@bookhub.local".to_string()
}

fn default_from_name() -> String {
    "BookHub".to_string()
}
