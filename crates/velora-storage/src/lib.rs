//! # velora-storage
//!
//! Adapters implementing the `velora-core` persistence ports:
//!
//! - `memory` — dashmap-backed [`MemoryStore`] for tests and ephemeral shells
//! - `file` — JSON-file-backed [`FileStore`] for native shells
//! - `cookies` — in-process [`MemoryCookieJar`] modeling the cookie surface

pub mod cookies;
pub mod file;
pub mod memory;

pub use cookies::{MemoryCookieJar, SameSite, StoredCookie};
pub use file::FileStore;
pub use memory::MemoryStore;
