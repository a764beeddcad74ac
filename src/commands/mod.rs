//! CLI command definitions and dispatch.

pub mod catalog;
pub mod config;
pub mod seed;

use clap::{Parser, Subcommand};

use bookhub_core::config::AppConfig;
use bookhub_core::error::AppError;

use crate::output::OutputFormat;

/// BookHub credential and authorization core
#[derive(Debug, Parser)]
#[command(name = "bookhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply ({config_dir}/{env}.toml)
    #[arg(long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the permission catalog and role defaults
    Catalog,
    /// Show the resolved configuration with secrets redacted
    Config,
    /// Seed an in-memory instance and list its accounts
    Seed(seed::SeedArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Catalog => catalog::execute(self.format),
            Commands::Config => config::execute(&config),
            Commands::Seed(args) => seed::execute(args, config, self.format).await,
        }
    }
}
