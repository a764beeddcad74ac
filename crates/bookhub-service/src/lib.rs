//! # bookhub-service
//!
//! Use-case services for BookHub. Each service orchestrates repositories,
//! the temporary credential cache and the auth core.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references. [`BookHub`] wires a complete
//! in-memory instance.

pub mod account;
pub mod admin;
pub mod app;
pub mod context;
pub mod dto;
pub mod seed;

pub use account::{AccountService, FORGOT_PASSWORD_MESSAGE};
pub use admin::AdminService;
pub use app::BookHub;
pub use context::RequestContext;
pub use seed::{SeedReport, Seeder};
