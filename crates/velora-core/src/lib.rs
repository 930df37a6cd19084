//! # velora-core
//!
//! Core crate for the Velora marketplace client runtime. Contains the port
//! traits, configuration schemas, domain types, session-change events, and
//! the unified error system.
//!
//! This crate has **no** internal dependencies on other Velora crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
