//! Admin user management: listing, edit view, role and permission updates.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use bookhub_auth::authorization::{AuthorizationModel, PermissionDrift, ReplaceOutcome, RoleAdministrator};
use bookhub_auth::CredentialLocks;
use bookhub_auth::rbac::RoleGate;
use bookhub_cache::TemporaryCredentialCache;
use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_core::types::AccountId;
use bookhub_database::AccountRepository;
use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

use crate::context::RequestContext;
use crate::dto::{EditUserRequest, UserQuery};

/// Row of the user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// Account ID.
    pub id: AccountId,
    /// User name.
    pub user_name: String,
    /// Email.
    pub email: String,
    /// Role name or `"No Role"`.
    pub role: String,
}

/// A role choice on the edit screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOption {
    /// Role.
    pub role: Role,
    /// Whether the user currently holds it.
    pub selected: bool,
}

/// A permission checkbox on the edit screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionOption {
    /// Dotted key.
    pub key: PermissionKey,
    /// Resource group the key belongs to.
    pub category: &'static str,
    /// Whether the user currently holds it.
    pub assigned: bool,
}

/// Everything the edit screen shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct EditUserView {
    /// Account ID.
    pub id: AccountId,
    /// Email.
    pub email: String,
    /// User name.
    pub user_name: String,
    /// Assignable roles.
    pub roles: Vec<RoleOption>,
    /// Full permission catalog.
    pub permissions: Vec<PermissionOption>,
    /// Difference between claims and the current role's defaults.
    pub drift: PermissionDrift,
}

/// Handles administrative user management operations.
///
/// Every operation requires the Admin or Staff role; changing roles and
/// permissions additionally requires user management rights. Deleting an
/// account is reserved to admins holding the `User.Delete` claim.
#[derive(Debug, Clone)]
pub struct AdminService {
    accounts: Arc<dyn AccountRepository>,
    model: Arc<AuthorizationModel>,
    administrator: Arc<RoleAdministrator>,
    cache: Arc<TemporaryCredentialCache>,
    locks: Arc<CredentialLocks>,
}

impl AdminService {
    /// Creates a new admin service.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        model: Arc<AuthorizationModel>,
        administrator: Arc<RoleAdministrator>,
        cache: Arc<TemporaryCredentialCache>,
        locks: Arc<CredentialLocks>,
    ) -> Self {
        Self {
            accounts,
            model,
            administrator,
            cache,
            locks,
        }
    }

    /// Lists users, optionally filtered by a case-insensitive substring of
    /// user name or email.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        query: UserQuery,
    ) -> AppResult<Vec<UserSummary>> {
        RoleGate::require_any(ctx.role, &RoleGate::ADMIN_AREA)?;

        let needle = query
            .search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut users = Vec::new();
        for account in self.accounts.list().await? {
            if let Some(needle) = &needle {
                let matches = account.user_name.to_lowercase().contains(needle)
                    || account.email.as_str().contains(needle.as_str());
                if !matches {
                    continue;
                }
            }
            let record = self.model.record(account.id).await?;
            users.push(UserSummary {
                id: account.id,
                user_name: account.user_name,
                email: account.email.to_string(),
                role: record.role_label().to_string(),
            });
        }

        Ok(users)
    }

    /// Builds the edit screen for `user_id`.
    pub async fn edit_user(&self, ctx: &RequestContext, user_id: AccountId) -> AppResult<EditUserView> {
        RoleGate::require_any(ctx.role, &RoleGate::ADMIN_AREA)?;

        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {user_id} not found")))?;
        let record = self.model.record(user_id).await?;
        let drift = self.model.drift(user_id).await?;

        Ok(EditUserView {
            id: account.id,
            email: account.email.to_string(),
            user_name: account.user_name,
            roles: Role::ASSIGNABLE
                .into_iter()
                .map(|role| RoleOption {
                    role,
                    selected: record.role == Some(role),
                })
                .collect(),
            permissions: PermissionKey::ALL
                .into_iter()
                .map(|key| PermissionOption {
                    key,
                    category: key.category(),
                    assigned: record.permissions.contains(&key),
                })
                .collect(),
            drift,
        })
    }

    /// Replaces the role and permissions of a user.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        req: EditUserRequest,
    ) -> AppResult<ReplaceOutcome> {
        RoleGate::require_any(ctx.role, &RoleGate::ADMIN_AREA)?;
        req.validate()?;
        let role: Role = req.role.parse()?;

        let outcome = self
            .administrator
            .replace_role_and_permissions(ctx.account_id, req.user_id, role, &req.permissions)
            .await?;

        info!(
            actor = %ctx.account_id,
            target = %req.user_id,
            role = %role,
            "User updated"
        );

        Ok(outcome)
    }

    /// Deletes `user_id` together with its roles, claims and any pending
    /// temporary password.
    ///
    /// The role comes from the caller's token; the `User.Delete` claim is
    /// read from the store so a revoked claim takes effect immediately.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: AccountId) -> AppResult<()> {
        RoleGate::require_role(ctx.role, Role::Admin)?;
        if !self
            .model
            .has_permission(ctx.account_id, PermissionKey::UserDelete)
            .await?
        {
            warn!(actor = %ctx.account_id, target = %user_id, "Deletion refused: missing User.Delete");
            return Err(AppError::forbidden("You are not allowed to delete users"));
        }
        if ctx.account_id == user_id {
            warn!(actor = %ctx.account_id, "Deletion refused: self-deletion");
            return Err(AppError::forbidden("Cannot delete your own account"));
        }

        let _guard = self.locks.acquire(user_id).await;
        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Account {user_id} not found")))?;

        self.administrator.revoke_all(user_id).await?;
        self.accounts.delete(user_id).await?;
        self.cache.invalidate(&account.email);

        info!(actor = %ctx.account_id, target = %user_id, "User deleted");
        Ok(())
    }
}
