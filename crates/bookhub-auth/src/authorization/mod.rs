//! Two-tier authorization: one primary role plus independent permission
//! claims.

pub mod administrator;
pub mod model;

pub use administrator::{ReplaceFailure, ReplaceOutcome, ReplaceStep, RoleAdministrator, RollbackStatus};
pub use model::{AuthorizationModel, PermissionDrift};
