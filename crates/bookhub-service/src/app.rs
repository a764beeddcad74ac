//! Wiring of a complete BookHub instance.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use bookhub_auth::authorization::{AuthorizationModel, RoleAdministrator};
use bookhub_auth::credential::{CredentialLocks, HashedCredentialStore};
use bookhub_auth::gate::AuthenticationGate;
use bookhub_auth::password::{PasswordHasher, PasswordValidator, SecretGenerator};
use bookhub_auth::rbac::RolePolicies;
use bookhub_auth::temporary::TemporaryCredentialIssuer;
use bookhub_auth::token::{IdentityTokenDecoder, IdentityTokenEncoder};
use bookhub_cache::{ExpirySweeper, TemporaryCredentialCache};
use bookhub_core::config::AppConfig;
use bookhub_core::result::AppResult;
use bookhub_core::traits::{Clock, CredentialStore, Mailer};
use bookhub_core::types::Email;
use bookhub_database::{
    AccountRepository, AuthorizationStore, MemoryAccountRepository, MemoryAuthorizationStore,
};

use crate::account::AccountService;
use crate::admin::AdminService;
use crate::seed::Seeder;

/// All components of one instance, constructed once and shared by `Arc`.
#[derive(Debug, Clone)]
pub struct BookHub {
    /// Resolved configuration.
    pub config: AppConfig,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Account rows.
    pub accounts: Arc<dyn AccountRepository>,
    /// Role and claim relations.
    pub authorization_store: Arc<dyn AuthorizationStore>,
    /// Pending temporary passwords.
    pub cache: Arc<TemporaryCredentialCache>,
    /// Permanent credentials.
    pub credentials: Arc<dyn CredentialStore>,
    /// Password hasher.
    pub hasher: Arc<PasswordHasher>,
    /// Identity token validation.
    pub tokens: Arc<IdentityTokenDecoder>,
    /// Authentication gate.
    pub gate: Arc<AuthenticationGate>,
    /// Temporary password issuer.
    pub issuer: Arc<TemporaryCredentialIssuer>,
    /// Authorization queries.
    pub model: Arc<AuthorizationModel>,
    /// Role and permission replacement.
    pub administrator: Arc<RoleAdministrator>,
    /// Account self-service.
    pub account_service: Arc<AccountService>,
    /// User administration.
    pub admin_service: Arc<AdminService>,
    /// Initial accounts.
    pub seeder: Arc<Seeder>,
}

impl BookHub {
    /// Builds an instance backed by the in-memory stores.
    pub fn in_memory(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> AppResult<Self> {
        let accounts = Arc::new(MemoryAccountRepository::new(clock.clone()));
        let authorization_store = Arc::new(MemoryAuthorizationStore::new());
        Self::with_stores(config, clock, mailer, accounts, authorization_store)
    }

    /// Builds an instance over caller-provided stores.
    pub fn with_stores(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
        accounts: Arc<dyn AccountRepository>,
        authorization_store: Arc<dyn AuthorizationStore>,
    ) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(HashedCredentialStore::new(accounts.clone(), hasher.clone()));
        let cache = Arc::new(TemporaryCredentialCache::new(
            clock.clone(),
            config.temporary_credential.ttl()?,
        ));
        let locks = Arc::new(CredentialLocks::new());
        let encoder = Arc::new(IdentityTokenEncoder::new(&config.auth, clock.clone())?);
        let tokens = Arc::new(IdentityTokenDecoder::new(&config.auth, clock.clone()));

        let gate = Arc::new(AuthenticationGate::new(
            accounts.clone(),
            credentials.clone(),
            cache.clone(),
            authorization_store.clone(),
            hasher.clone(),
            encoder,
            locks.clone(),
        ));
        let issuer = Arc::new(TemporaryCredentialIssuer::new(
            credentials.clone(),
            cache.clone(),
            mailer,
            SecretGenerator::new(config.temporary_credential.length),
            config.email.clone(),
            locks.clone(),
        ));
        let model = Arc::new(AuthorizationModel::new(
            authorization_store.clone(),
            RolePolicies::new(),
        ));
        let administrator = Arc::new(RoleAdministrator::new(
            accounts.clone(),
            authorization_store.clone(),
        ));

        let account_service = Arc::new(AccountService::new(
            accounts.clone(),
            authorization_store.clone(),
            credentials.clone(),
            cache.clone(),
            hasher.clone(),
            validator,
            gate.clone(),
            issuer.clone(),
            tokens.clone(),
            locks.clone(),
            Email::parse(&config.seed.admin_email).ok(),
            clock.clone(),
        ));
        let admin_service = Arc::new(AdminService::new(
            accounts.clone(),
            model.clone(),
            administrator.clone(),
            cache.clone(),
            locks,
        ));
        let seeder = Arc::new(Seeder::new(
            accounts.clone(),
            authorization_store.clone(),
            hasher.clone(),
            config.seed.clone(),
            clock.clone(),
        ));

        Ok(Self {
            config,
            clock,
            accounts,
            authorization_store,
            cache,
            credentials,
            hasher,
            tokens,
            gate,
            issuer,
            model,
            administrator,
            account_service,
            admin_service,
            seeder,
        })
    }

    /// Starts the background sweep of expired temporary passwords and of
    /// revocations of identity tokens that have expired anyway.
    pub fn spawn_sweeper(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        ExpirySweeper::new(self.config.temporary_credential.sweep_interval())
            .with_target(self.cache.clone())
            .with_target(self.tokens.clone())
            .spawn(shutdown)
    }
}
