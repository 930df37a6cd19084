//! Port traits implemented by the adapter crates.

pub mod auth;
pub mod clock;
pub mod cookies;
pub mod device;
pub mod storage;

pub use auth::{AuthBackend, RefreshedTokens};
pub use clock::{Clock, SystemClock};
pub use cookies::CookieJar;
pub use device::DeviceIdProvider;
pub use storage::KeyValueStore;
