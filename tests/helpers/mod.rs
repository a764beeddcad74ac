//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bookhub_auth::gate::AuthenticatedSession;
use bookhub_core::config::{AppConfig, AuthConfig};
use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::traits::{Clock, Mailer, ManualClock};
use bookhub_entity::account::Account;
use bookhub_service::dto::{LoginRequest, RegisterRequest};
use bookhub_service::{BookHub, RequestContext};

/// Password that satisfies the registration policy.
pub const STRONG_PASSWORD: &str = "Violet#Harbor-Quartz92";
/// A second policy-compliant password.
pub const OTHER_STRONG_PASSWORD: &str = "Amber!Canyon-Meadow57";

/// One captured email.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records every attempted send and can be told to fail.
#[derive(Debug, Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl CapturingMailer {
    /// Makes subsequent sends fail (after recording them).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded sends.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Temporary password from the latest email to `to`.
    pub fn last_temporary_password(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .and_then(|m| {
                m.body
                    .lines()
                    .find_map(|l| l.strip_prefix("Your temporary password is: "))
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::internal("SMTP relay refused the message"));
        }
        Ok(())
    }
}

/// Test application context
pub struct TestApp {
    /// Fully wired in-memory instance
    pub app: BookHub,
    /// Clock shared by every component
    pub clock: Arc<ManualClock>,
    /// Captured outgoing mail
    pub mailer: Arc<CapturingMailer>,
}

impl TestApp {
    /// Configuration with cheap hashing.
    pub fn config() -> AppConfig {
        AppConfig {
            auth: AuthConfig {
                token_secret: "integration-test-secret".to_string(),
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        }
    }

    /// Create an empty application.
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        let mailer = Arc::new(CapturingMailer::default());
        let app = BookHub::in_memory(Self::config(), clock.clone(), mailer.clone())
            .expect("Failed to build test app");
        Self { app, clock, mailer }
    }

    /// Create an application with the admin and staff accounts seeded.
    pub async fn seeded() -> Self {
        let test_app = Self::new();
        test_app.app.seeder.run().await.expect("Failed to seed");
        test_app
    }

    /// Register an account with [`STRONG_PASSWORD`].
    pub async fn register(&self, email: &str) -> Account {
        self.app
            .account_service
            .register(RegisterRequest {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "Reader".to_string(),
                password: STRONG_PASSWORD.to_string(),
                confirm_password: STRONG_PASSWORD.to_string(),
            })
            .await
            .expect("Failed to register")
    }

    /// Log in.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthenticatedSession> {
        self.app
            .account_service
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    /// Request context of a logged-in account.
    pub async fn context(&self, email: &str, password: &str) -> RequestContext {
        let session = self.login(email, password).await.expect("Failed to log in");
        self.app
            .account_service
            .authorize(&session.identity_token)
            .expect("Fresh token rejected")
    }

    /// Context of the seeded administrator.
    pub async fn admin_context(&self) -> RequestContext {
        let seed = &self.app.config.seed;
        self.context(&seed.admin_email, &seed.admin_password).await
    }

    /// Context of the seeded staff account.
    pub async fn staff_context(&self) -> RequestContext {
        let seed = &self.app.config.seed;
        self.context(&seed.staff_email, &seed.staff_password).await
    }

    /// Current instant of the shared clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
