//! Collaborator traits defined in `bookhub-core` and implemented by other
//! crates (or by the embedding application).

pub mod clock;
pub mod credential;
pub mod expiring;
pub mod mailer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::CredentialStore;
pub use expiring::ExpiringStore;
pub use mailer::{LogMailer, Mailer};
