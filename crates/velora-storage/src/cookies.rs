//! In-process cookie jar adapter.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use velora_core::result::AppResult;
use velora_core::traits::CookieJar;

/// `SameSite` cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations and same-site requests.
    Lax,
    /// Sent only on same-site requests.
    Strict,
}

/// A cookie as held by the jar, attributes included.
#[derive(Debug, Clone)]
pub struct StoredCookie {
    /// Cookie value.
    pub value: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// `Secure` attribute (set on HTTPS origins).
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

/// In-process [`CookieJar`].
///
/// Models the browser cookie surface for native shells and tests: expired
/// cookies disappear on read, and every cookie written carries the session
/// policy attributes (`Secure` iff the origin is HTTPS, `SameSite=Lax`).
#[derive(Debug)]
pub struct MemoryCookieJar {
    /// Name → cookie.
    cookies: DashMap<String, StoredCookie>,
    /// Whether the origin is HTTPS (drives the `Secure` attribute).
    https_origin: bool,
}

impl MemoryCookieJar {
    /// Create a jar for the given origin scheme.
    pub fn new(https_origin: bool) -> Self {
        Self {
            cookies: DashMap::new(),
            https_origin,
        }
    }

    /// Inspect a cookie with its attributes (diagnostic/testing).
    pub fn inspect(&self, name: &str) -> Option<StoredCookie> {
        self.cookies.get(name).map(|c| c.value().clone())
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar is empty.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, name: &str, value: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.cookies.insert(
            name.to_string(),
            StoredCookie {
                value: value.to_string(),
                expires_at,
                secure: self.https_origin,
                same_site: SameSite::Lax,
            },
        );
        Ok(())
    }

    fn get(&self, name: &str) -> AppResult<Option<String>> {
        match self.cookies.get(name) {
            Some(cookie) if cookie.expires_at > Utc::now() => Ok(Some(cookie.value.clone())),
            Some(_) => {
                drop(self.cookies.remove(name));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn remove(&self, name: &str) -> AppResult<()> {
        self.cookies.remove(name);
        Ok(())
    }
}
