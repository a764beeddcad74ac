//! Role defaults and route-level role enforcement.

pub mod enforcer;
pub mod policies;

pub use enforcer::RoleGate;
pub use policies::RolePolicies;
