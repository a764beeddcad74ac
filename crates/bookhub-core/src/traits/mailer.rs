//! Outgoing email contract.

use async_trait::async_trait;
use tracing::info;

use crate::result::AppResult;

/// Delivers a plain-text email.
///
/// A failed send is a recoverable error, never fatal to the process.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug + 'static {
    /// Sends `body` to `to`.
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Mailer for development setups: records the send in the log without the
/// body, which may carry a secret.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        info!(to = %to, subject = %subject, body_len = body.len(), "Email dispatched");
        Ok(())
    }
}
