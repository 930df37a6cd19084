//! Cookie surface port.
//!
//! The cookie surface is the second, redundant persistence surface: a
//! minimal (token, role, expiry) triple that server-rendered components can
//! read without parsing the durable store. Only the session store writes it,
//! which is what keeps the two surfaces consistent.

use chrono::{DateTime, Utc};

use crate::result::AppResult;

/// Write/read access to the session cookies.
///
/// Adapters own the transport attributes: cookies must be flagged `Secure`
/// on HTTPS origins and carry `SameSite=Lax`. Expiry is explicit per cookie
/// because the retention window depends on the remember-me choice, not on
/// the cookie's name.
pub trait CookieJar: Send + Sync + std::fmt::Debug + 'static {
    /// Set a cookie with an absolute expiry.
    fn set(&self, name: &str, value: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Read a cookie value. Expired or missing cookies are `Ok(None)`.
    fn get(&self, name: &str) -> AppResult<Option<String>>;

    /// Remove a single cookie.
    fn remove(&self, name: &str) -> AppResult<()>;
}
