//! Seeding of an in-memory instance.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use bookhub_core::config::AppConfig;
use bookhub_core::error::AppError;
use bookhub_core::traits::{LogMailer, SystemClock};
use bookhub_service::BookHub;

use crate::output::{self, OutputFormat};

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Also print role/claim drift for every account
    #[arg(long)]
    pub drift: bool,
}

/// Account display row
#[derive(Debug, Serialize, Tabled)]
struct AccountRow {
    /// Email
    email: String,
    /// Role or "No Role"
    role: String,
    /// Granted permission keys
    permissions: String,
    /// Defaults of the role not granted
    missing: String,
    /// Grants beyond the role's defaults
    extra: String,
}

fn join<'a>(keys: impl IntoIterator<Item = &'a bookhub_entity::permission::PermissionKey>) -> String {
    keys.into_iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Execute the seed command
pub async fn execute(
    args: &SeedArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = BookHub::in_memory(config, Arc::new(SystemClock), Arc::new(LogMailer))?;
    let report = app.seeder.run().await?;
    output::print_success(&format!(
        "Seeded {} account(s), {} claim(s)",
        report.created.len(),
        report.claims_added
    ));

    let mut rows = Vec::new();
    for account in app.accounts.list().await? {
        let record = app.model.record(account.id).await?;
        let (missing, extra) = if args.drift {
            let drift = app.model.drift(account.id).await?;
            (join(&drift.missing), join(&drift.extra))
        } else {
            (String::new(), String::new())
        };
        rows.push(AccountRow {
            email: account.email.to_string(),
            role: record.role_label().to_string(),
            permissions: join(&record.permissions),
            missing,
            extra,
        });
    }

    output::print_list(&rows, format);
    Ok(())
}
