//! Authentication gate and its outcomes.

pub mod authenticator;
pub mod session;

pub use authenticator::AuthenticationGate;
pub use session::{AuthMethod, AuthOutcome, AuthenticatedSession};
