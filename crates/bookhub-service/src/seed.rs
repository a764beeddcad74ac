//! Initial accounts.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use bookhub_auth::password::PasswordHasher;
use bookhub_core::config::SeedConfig;
use bookhub_core::result::AppResult;
use bookhub_core::traits::Clock;
use bookhub_core::types::Email;
use bookhub_database::{AccountRepository, AuthorizationStore};
use bookhub_entity::account::{Account, NewAccount, Role};
use bookhub_entity::permission::PermissionKey;

/// Claims given to the seeded administrator.
pub const ADMIN_SEED_PERMISSIONS: [PermissionKey; 8] = [
    PermissionKey::UserView,
    PermissionKey::UserEdit,
    PermissionKey::UserDelete,
    PermissionKey::UserManage,
    PermissionKey::BookCreate,
    PermissionKey::BookView,
    PermissionKey::BookUpdate,
    PermissionKey::BookDelete,
];

/// Claims given to the seeded staff account.
pub const STAFF_SEED_PERMISSIONS: [PermissionKey; 3] = [
    PermissionKey::BookCreate,
    PermissionKey::BookView,
    PermissionKey::BookUpdate,
];

/// What a seeding run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Accounts created by this run.
    pub created: Vec<String>,
    /// Claims added by this run, across all seeded accounts.
    pub claims_added: usize,
}

/// Creates the administrator and staff accounts if they are missing.
///
/// Safe to run on every start: existing accounts keep their password and
/// only missing roles or claims are added.
#[derive(Debug, Clone)]
pub struct Seeder {
    accounts: Arc<dyn AccountRepository>,
    authorization: Arc<dyn AuthorizationStore>,
    hasher: Arc<PasswordHasher>,
    config: SeedConfig,
    clock: Arc<dyn Clock>,
}

impl Seeder {
    /// Creates a seeder.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        authorization: Arc<dyn AuthorizationStore>,
        hasher: Arc<PasswordHasher>,
        config: SeedConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            authorization,
            hasher,
            config,
            clock,
        }
    }

    /// Seeds both accounts.
    pub async fn run(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        let admin = self
            .ensure_account(
                &self.config.admin_email,
                &self.config.admin_password,
                "Admin",
                &mut report,
            )
            .await?;
        report.claims_added += self
            .ensure_grants(&admin, Role::Admin, &ADMIN_SEED_PERMISSIONS)
            .await?;

        let staff = self
            .ensure_account(
                &self.config.staff_email,
                &self.config.staff_password,
                "Staff",
                &mut report,
            )
            .await?;
        report.claims_added += self
            .ensure_grants(&staff, Role::Staff, &STAFF_SEED_PERMISSIONS)
            .await?;

        info!(
            created = report.created.len(),
            claims_added = report.claims_added,
            "Seeding finished"
        );
        Ok(report)
    }

    async fn ensure_account(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        report: &mut SeedReport,
    ) -> AppResult<Account> {
        let email = Email::parse(email)?;
        if let Some(existing) = self.accounts.find_by_email(&email).await? {
            return Ok(existing);
        }

        let account = self
            .accounts
            .create(
                NewAccount {
                    email,
                    first_name: first_name.to_string(),
                    last_name: "User".to_string(),
                    password_hash: self.hasher.hash_password(password)?,
                }
                .into_account(self.clock.now()),
            )
            .await?;
        info!(account_id = %account.id, email = %account.email, "Seeded account");
        report.created.push(account.email.to_string());
        Ok(account)
    }

    /// Adds `role` (replacing a different one) and whichever of `keys` are
    /// missing. Returns the number of claims added.
    async fn ensure_grants(
        &self,
        account: &Account,
        role: Role,
        keys: &[PermissionKey],
    ) -> AppResult<usize> {
        let mut tx = self.authorization.begin(account.id).await?;

        if tx.current().role != Some(role) {
            tx.remove_roles().await?;
            tx.add_role(role).await?;
        }

        let missing: BTreeSet<PermissionKey> = keys
            .iter()
            .copied()
            .filter(|key| !tx.current().permissions.contains(key))
            .collect();
        if !missing.is_empty() {
            tx.add_permission_claims(&missing).await?;
        }

        tx.commit().await?;
        Ok(missing.len())
    }
}
