//! Privileged, atomic replacement of an account's role and claims.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::types::AccountId;
use bookhub_database::{AccountRepository, AuthorizationStore, AuthorizationTransaction};
use bookhub_entity::account::Role;
use bookhub_entity::permission::{AuthorizationRecord, PermissionKey};

use crate::rbac::RoleGate;

/// One step of a replacement, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplaceStep {
    /// Remove every role membership.
    RemoveRoles,
    /// Add the requested role.
    AddRole,
    /// Remove every permission claim.
    RemovePermissionClaims,
    /// Add the requested claims.
    AddPermissionClaims,
    /// Publish the staged record.
    Commit,
}

impl fmt::Display for ReplaceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RemoveRoles => "remove roles",
            Self::AddRole => "add role",
            Self::RemovePermissionClaims => "remove permission claims",
            Self::AddPermissionClaims => "add permission claims",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// What happened to the staged changes after a failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RollbackStatus {
    /// The transaction was rolled back; the previous record is intact.
    Succeeded,
    /// The rollback itself failed.
    Failed(String),
    /// The commit failed, so there was no open transaction left to roll back.
    NotAttempted,
}

/// Details of a replacement that stopped half way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceFailure {
    /// Account being modified.
    pub target: AccountId,
    /// Steps that finished before the failure.
    pub completed: Vec<ReplaceStep>,
    /// Step that failed.
    pub failed: ReplaceStep,
    /// Cause reported by the store.
    pub cause: String,
    /// Outcome of the rollback.
    pub rollback: RollbackStatus,
}

impl fmt::Display for ReplaceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let completed = if self.completed.is_empty() {
            "none".to_string()
        } else {
            self.completed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let rollback = match &self.rollback {
            RollbackStatus::Succeeded => "rollback succeeded".to_string(),
            RollbackStatus::Failed(e) => format!("rollback failed: {e}"),
            RollbackStatus::NotAttempted => "rollback not attempted".to_string(),
        };
        write!(
            f,
            "Updating roles and permissions of account {} failed at step '{}' ({}); completed steps: {}; {}",
            self.target, self.failed, self.cause, completed, rollback
        )
    }
}

impl From<ReplaceFailure> for AppError {
    fn from(failure: ReplaceFailure) -> Self {
        AppError::partial_failure(failure.to_string())
    }
}

/// Result of a successful replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceOutcome {
    /// Account that was modified.
    pub target: AccountId,
    /// Record before the replacement.
    pub previous: AuthorizationRecord,
    /// Record after the replacement.
    pub current: AuthorizationRecord,
}

/// Replaces roles and permission claims on behalf of an administrator.
#[derive(Debug, Clone)]
pub struct RoleAdministrator {
    accounts: Arc<dyn AccountRepository>,
    store: Arc<dyn AuthorizationStore>,
}

impl RoleAdministrator {
    /// Creates an administrator over the given stores.
    pub fn new(accounts: Arc<dyn AccountRepository>, store: Arc<dyn AuthorizationStore>) -> Self {
        Self { accounts, store }
    }

    /// Whether `actor` may change other accounts' roles and permissions.
    pub async fn can_administer(&self, actor: AccountId) -> AppResult<bool> {
        let record = self.store.record(actor).await?;
        Ok(RoleGate::is_admin(record.role)
            || record.permissions.contains(&PermissionKey::UserManage))
    }

    /// Makes `new_role` the only role of `target` and `raw_keys` its exact
    /// permission set.
    ///
    /// All four steps run in one store transaction: readers see either the
    /// old record or the new one. Unknown keys are rejected before anything
    /// is touched. Applying the same request twice leaves the same state.
    pub async fn replace_role_and_permissions<S: AsRef<str>>(
        &self,
        actor: AccountId,
        target: AccountId,
        new_role: Role,
        raw_keys: &[S],
    ) -> AppResult<ReplaceOutcome> {
        if !self.can_administer(actor).await? {
            warn!(actor = %actor, target = %target, "Role change refused: actor lacks user management rights");
            return Err(AppError::forbidden(
                "You are not allowed to change roles or permissions",
            ));
        }

        if !new_role.is_assignable() {
            return Err(AppError::forbidden(format!(
                "Role '{new_role}' cannot be assigned"
            )));
        }

        let keys = PermissionKey::parse_set(raw_keys)?;

        if actor == target {
            warn!(actor = %actor, "Role change refused: self-modification");
            return Err(AppError::forbidden(
                "Cannot change your own role or permissions",
            ));
        }

        if self.accounts.find_by_id(target).await?.is_none() {
            return Err(AppError::not_found(format!("Account {target} not found")));
        }

        let mut tx = self.store.begin(target).await?;
        let previous = tx.current().clone();
        let mut completed = Vec::with_capacity(4);

        if let Err((failed, cause)) = apply(tx.as_mut(), new_role, &keys, &mut completed).await {
            let rollback = match tx.rollback().await {
                Ok(()) => RollbackStatus::Succeeded,
                Err(e) => RollbackStatus::Failed(e.message),
            };
            let failure = ReplaceFailure {
                target,
                completed,
                failed,
                cause: cause.message,
                rollback,
            };
            error!(actor = %actor, target = %target, failure = %failure, "Role replacement failed");
            return Err(failure.into());
        }

        let current = tx.current().clone();
        if let Err(cause) = tx.commit().await {
            let failure = ReplaceFailure {
                target,
                completed,
                failed: ReplaceStep::Commit,
                cause: cause.message,
                rollback: RollbackStatus::NotAttempted,
            };
            error!(actor = %actor, target = %target, failure = %failure, "Role replacement failed");
            return Err(failure.into());
        }

        info!(
            actor = %actor,
            target = %target,
            old_role = previous.role_label(),
            new_role = %new_role,
            old_claims = previous.permissions.len(),
            new_claims = current.permissions.len(),
            "Roles and permissions replaced"
        );

        Ok(ReplaceOutcome {
            target,
            previous,
            current,
        })
    }

    /// Strips every role and permission claim from `target` in one
    /// transaction. Returns the record as it was before.
    pub async fn revoke_all(&self, target: AccountId) -> AppResult<AuthorizationRecord> {
        let mut tx = self.store.begin(target).await?;
        let previous = tx.current().clone();

        let staged = async {
            tx.remove_roles().await?;
            tx.remove_permission_claims().await?;
            Ok::<(), AppError>(())
        }
        .await;
        if let Err(cause) = staged {
            if let Err(e) = tx.rollback().await {
                error!(target = %target, error = %e, "Rollback after failed revocation failed");
            }
            return Err(cause);
        }
        tx.commit().await?;

        info!(
            target = %target,
            old_role = previous.role_label(),
            old_claims = previous.permissions.len(),
            "Roles and permissions revoked"
        );
        Ok(previous)
    }
}

async fn apply(
    tx: &mut dyn AuthorizationTransaction,
    role: Role,
    keys: &BTreeSet<PermissionKey>,
    completed: &mut Vec<ReplaceStep>,
) -> Result<(), (ReplaceStep, AppError)> {
    tx.remove_roles()
        .await
        .map_err(|e| (ReplaceStep::RemoveRoles, e))?;
    completed.push(ReplaceStep::RemoveRoles);

    tx.add_role(role)
        .await
        .map_err(|e| (ReplaceStep::AddRole, e))?;
    completed.push(ReplaceStep::AddRole);

    tx.remove_permission_claims()
        .await
        .map_err(|e| (ReplaceStep::RemovePermissionClaims, e))?;
    completed.push(ReplaceStep::RemovePermissionClaims);

    tx.add_permission_claims(keys)
        .await
        .map_err(|e| (ReplaceStep::AddPermissionClaims, e))?;
    completed.push(ReplaceStep::AddPermissionClaims);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookhub_core::ErrorKind;
    use bookhub_core::types::Email;
    use bookhub_database::{MemoryAccountRepository, MemoryAuthorizationStore};
    use bookhub_entity::account::NewAccount;

    struct Fixture {
        accounts: Arc<MemoryAccountRepository>,
        store: Arc<MemoryAuthorizationStore>,
        admin: AccountId,
        staff: AccountId,
    }

    async fn create(accounts: &MemoryAccountRepository, email: &str) -> AccountId {
        accounts
            .create(
                NewAccount {
                    email: Email::parse(email).unwrap(),
                    first_name: "F".into(),
                    last_name: "L".into(),
                    password_hash: String::new(),
                }
                .into_account(chrono::Utc::now()),
            )
            .await
            .unwrap()
            .id
    }

    async fn grant(store: &MemoryAuthorizationStore, id: AccountId, role: Option<Role>, keys: &[PermissionKey]) {
        let mut tx = store.begin(id).await.unwrap();
        if let Some(role) = role {
            tx.add_role(role).await.unwrap();
        }
        tx.add_permission_claims(&keys.iter().copied().collect())
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    async fn fixture() -> Fixture {
        let accounts = Arc::new(MemoryAccountRepository::default());
        let store = Arc::new(MemoryAuthorizationStore::new());
        let admin = create(&accounts, "admin@example.com").await;
        let staff = create(&accounts, "staff@example.com").await;
        grant(&store, admin, Some(Role::Admin), &PermissionKey::ALL).await;
        grant(
            &store,
            staff,
            Some(Role::Staff),
            &[PermissionKey::BookView, PermissionKey::BookCreate],
        )
        .await;
        Fixture {
            accounts,
            store,
            admin,
            staff,
        }
    }

    fn administrator(f: &Fixture) -> RoleAdministrator {
        RoleAdministrator::new(f.accounts.clone(), f.store.clone())
    }

    #[tokio::test]
    async fn test_promotion_replaces_claims() {
        let f = fixture().await;
        let outcome = administrator(&f)
            .replace_role_and_permissions(
                f.admin,
                f.staff,
                Role::Admin,
                &["Book.View", "Book.Delete", "User.Manage"],
            )
            .await
            .unwrap();

        assert_eq!(outcome.previous.role, Some(Role::Staff));
        let record = f.store.record(f.staff).await.unwrap();
        assert_eq!(record.role, Some(Role::Admin));
        assert_eq!(
            record.permissions,
            BTreeSet::from([
                PermissionKey::BookView,
                PermissionKey::BookDelete,
                PermissionKey::UserManage,
            ])
        );
        assert!(!record.permissions.contains(&PermissionKey::BookCreate));
    }

    #[tokio::test]
    async fn test_replace_is_idempotent() {
        let f = fixture().await;
        let admin = administrator(&f);
        let keys = ["Order.View", "Order.Update"];

        let first = admin
            .replace_role_and_permissions(f.admin, f.staff, Role::Staff, &keys)
            .await
            .unwrap();
        let second = admin
            .replace_role_and_permissions(f.admin, f.staff, Role::Staff, &keys)
            .await
            .unwrap();
        assert_eq!(first.current, second.current);
        assert_eq!(second.previous, second.current);
    }

    #[tokio::test]
    async fn test_self_modification_is_refused() {
        let f = fixture().await;
        let err = administrator(&f)
            .replace_role_and_permissions(f.admin, f.admin, Role::Staff, &["Book.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let record = f.store.record(f.admin).await.unwrap();
        assert_eq!(record.role, Some(Role::Admin));
        assert_eq!(record.permissions.len(), PermissionKey::ALL.len());
    }

    #[tokio::test]
    async fn test_actor_without_rights_is_refused() {
        let f = fixture().await;
        let err = administrator(&f)
            .replace_role_and_permissions(f.staff, f.admin, Role::Staff, &["Book.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_user_manage_claim_grants_rights() {
        let f = fixture().await;
        let manager = create(&f.accounts, "manager@example.com").await;
        grant(&f.store, manager, Some(Role::Staff), &[PermissionKey::UserManage]).await;

        administrator(&f)
            .replace_role_and_permissions(manager, f.staff, Role::Staff, &["Book.View"])
            .await
            .unwrap();
        assert_eq!(
            f.store.record(f.staff).await.unwrap().permissions,
            BTreeSet::from([PermissionKey::BookView])
        );
    }

    #[tokio::test]
    async fn test_customer_role_is_not_assignable() {
        let f = fixture().await;
        let err = administrator(&f)
            .replace_role_and_permissions(f.admin, f.staff, Role::Customer, &["Book.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_unknown_key_rejected_before_mutation() {
        let f = fixture().await;
        let err = administrator(&f)
            .replace_role_and_permissions(f.admin, f.staff, Role::Admin, &["Book.View", "Book.Burn"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("Book.Burn"));
        assert_eq!(
            f.store.record(f.staff).await.unwrap().role,
            Some(Role::Staff)
        );
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let f = fixture().await;
        let err = administrator(&f)
            .replace_role_and_permissions(f.admin, AccountId::new(), Role::Staff, &["Book.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_revoke_all_empties_the_record() {
        let f = fixture().await;
        let previous = administrator(&f).revoke_all(f.staff).await.unwrap();
        assert_eq!(previous.role, Some(Role::Staff));
        assert_eq!(previous.permissions.len(), 2);

        let stored = f.store.record(f.staff).await.unwrap();
        assert_eq!(stored.role, None);
        assert!(stored.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_failed_revocation_keeps_the_record() {
        let (f, administrator) = faulty(ReplaceStep::RemovePermissionClaims, false).await;
        let before = f.store.record(f.staff).await.unwrap();
        assert!(administrator.revoke_all(f.staff).await.is_err());
        assert_eq!(f.store.record(f.staff).await.unwrap(), before);
    }

    /// Store whose transactions fail at a chosen step.
    #[derive(Debug)]
    struct FaultyStore {
        inner: MemoryAuthorizationStore,
        fail_at: ReplaceStep,
        fail_rollback: bool,
    }

    struct FaultyTransaction {
        inner: Box<dyn AuthorizationTransaction>,
        fail_at: ReplaceStep,
        fail_rollback: bool,
    }

    impl FaultyTransaction {
        fn check(&self, step: ReplaceStep) -> AppResult<()> {
            if step == self.fail_at {
                Err(AppError::internal(format!("injected failure at {step}")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AuthorizationStore for FaultyStore {
        async fn record(&self, account_id: AccountId) -> AppResult<AuthorizationRecord> {
            self.inner.record(account_id).await
        }

        async fn begin(&self, account_id: AccountId) -> AppResult<Box<dyn AuthorizationTransaction>> {
            Ok(Box::new(FaultyTransaction {
                inner: self.inner.begin(account_id).await?,
                fail_at: self.fail_at,
                fail_rollback: self.fail_rollback,
            }))
        }
    }

    #[async_trait]
    impl AuthorizationTransaction for FaultyTransaction {
        fn current(&self) -> &AuthorizationRecord {
            self.inner.current()
        }

        async fn remove_roles(&mut self) -> AppResult<Vec<Role>> {
            self.check(ReplaceStep::RemoveRoles)?;
            self.inner.remove_roles().await
        }

        async fn add_role(&mut self, role: Role) -> AppResult<()> {
            self.check(ReplaceStep::AddRole)?;
            self.inner.add_role(role).await
        }

        async fn remove_permission_claims(&mut self) -> AppResult<usize> {
            self.check(ReplaceStep::RemovePermissionClaims)?;
            self.inner.remove_permission_claims().await
        }

        async fn add_permission_claims(&mut self, keys: &BTreeSet<PermissionKey>) -> AppResult<()> {
            self.check(ReplaceStep::AddPermissionClaims)?;
            self.inner.add_permission_claims(keys).await
        }

        async fn commit(self: Box<Self>) -> AppResult<()> {
            self.check(ReplaceStep::Commit)?;
            self.inner.commit().await
        }

        async fn rollback(self: Box<Self>) -> AppResult<()> {
            if self.fail_rollback {
                return Err(AppError::internal("rollback lost"));
            }
            self.inner.rollback().await
        }
    }

    async fn faulty(fail_at: ReplaceStep, fail_rollback: bool) -> (Fixture, RoleAdministrator) {
        let f = fixture().await;
        let store = Arc::new(FaultyStore {
            inner: (*f.store).clone(),
            fail_at,
            fail_rollback,
        });
        let administrator = RoleAdministrator::new(f.accounts.clone(), store);
        (f, administrator)
    }

    #[tokio::test]
    async fn test_partial_failure_rolls_back() {
        let (f, administrator) = faulty(ReplaceStep::AddPermissionClaims, false).await;
        let before = f.store.record(f.staff).await.unwrap();

        let err = administrator
            .replace_role_and_permissions(f.admin, f.staff, Role::Admin, &["User.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PartialFailure);
        assert!(err.message.contains("failed at step 'add permission claims'"));
        assert!(err
            .message
            .contains("completed steps: remove roles, add role, remove permission claims"));
        assert!(err.message.contains("rollback succeeded"));

        assert_eq!(f.store.record(f.staff).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_partial_failure_reports_failed_rollback() {
        let (f, administrator) = faulty(ReplaceStep::AddRole, true).await;
        let err = administrator
            .replace_role_and_permissions(f.admin, f.staff, Role::Admin, &["User.View"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PartialFailure);
        assert!(err.message.contains("completed steps: remove roles;"));
        assert!(err.message.contains("rollback failed: rollback lost"));
    }

    #[tokio::test]
    async fn test_commit_failure_publishes_nothing() {
        let (f, administrator) = faulty(ReplaceStep::Commit, false).await;
        let before = f.store.record(f.staff).await.unwrap();
        let err = administrator
            .replace_role_and_permissions(f.admin, f.staff, Role::Admin, &["User.View"])
            .await
            .unwrap_err();
        assert!(err.message.contains("failed at step 'commit'"));
        assert!(err.message.contains("rollback not attempted"));
        assert_eq!(f.store.record(f.staff).await.unwrap(), before);
    }
}
