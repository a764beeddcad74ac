//! Permission catalog listing.

use serde::Serialize;
use tabled::Tabled;

use bookhub_auth::rbac::RolePolicies;
use bookhub_core::error::AppError;
use bookhub_entity::account::Role;
use bookhub_entity::permission::PermissionKey;

use crate::output::{self, OutputFormat};

/// Catalog display row
#[derive(Debug, Serialize, Tabled)]
struct CatalogRow {
    /// Dotted key
    key: &'static str,
    /// Resource group
    category: &'static str,
    /// Default for Admin
    admin: &'static str,
    /// Default for Staff
    staff: &'static str,
    /// Default for Customer
    customer: &'static str,
}

fn mark(policies: &RolePolicies, role: Role, key: PermissionKey) -> &'static str {
    if policies.has_default(role, key) { "yes" } else { "" }
}

/// Execute the catalog command
pub fn execute(format: OutputFormat) -> Result<(), AppError> {
    let policies = RolePolicies::new();
    let rows: Vec<CatalogRow> = PermissionKey::ALL
        .into_iter()
        .map(|key| CatalogRow {
            key: key.as_str(),
            category: key.category(),
            admin: mark(&policies, Role::Admin, key),
            staff: mark(&policies, Role::Staff, key),
            customer: mark(&policies, Role::Customer, key),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
