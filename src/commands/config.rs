//! Resolved configuration display.

use bookhub_core::config::AppConfig;
use bookhub_core::error::AppError;

use crate::output;

/// Execute the config command
pub fn execute(config: &AppConfig) -> Result<(), AppError> {
    output::print_item(&config.redacted());
    Ok(())
}
