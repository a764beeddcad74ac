//! Seed account configuration.

use serde::{Deserialize, Serialize};

/// Accounts created on first start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Email of the initial administrator. Registrations using this email
    /// also receive the Admin role.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Initial administrator password.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Email of the initial staff account.
    #[serde(default = "default_staff_email")]
    pub staff_email: String,
    /// Initial staff password.
    #[serde(default = "default_staff_password")]
    pub staff_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            staff_email: default_staff_email(),
            staff_password: default_staff_password(),
        }
    }
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_password() -> String {
    "Admin@123".to_string()
}

fn default_staff_email() -> String {
    "staff@example.com".to_string()
}

fn default_staff_password() -> String {
    "Staff@123".to_string()
}
