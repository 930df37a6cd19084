//! Domain types shared across Velora crates.

pub mod session;
pub mod user;

pub use session::{Session, SessionInfo};
pub use user::{User, UserRole};
