//! # bookhub-entity
//!
//! Domain entities for the credential and authorization core: accounts,
//! roles, permission keys, and temporary credential entries.

pub mod account;
pub mod credential;
pub mod permission;
