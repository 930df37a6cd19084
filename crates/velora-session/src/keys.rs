//! Persisted key and cookie names.
//!
//! The durable store and the cookie surface are written by separate
//! statements; keeping every name in one module is what lets the store
//! guarantee `clear_session` removes exactly the keys `save_session` wrote.

/// Durable key: opaque access token.
pub const ACCESS_TOKEN: &str = "velora.session.access_token";
/// Durable key: opaque refresh token.
pub const REFRESH_TOKEN: &str = "velora.session.refresh_token";
/// Durable key: JSON-serialized user snapshot.
pub const USER: &str = "velora.session.user";
/// Durable key: absolute expiry, epoch milliseconds, string-encoded.
pub const EXPIRES_AT: &str = "velora.session.expires_at";
/// Durable key: remember-me flag, `"true"`/`"false"`.
pub const REMEMBER_ME: &str = "velora.session.remember_me";
/// Durable key: last activity, epoch milliseconds, string-encoded.
pub const LAST_ACTIVITY: &str = "velora.session.last_activity";
/// Durable key: device identifier. The only key that survives `clear_session`.
pub const DEVICE_ID: &str = "velora.device_id";

/// Every session-scoped durable key, in write order. Excludes [`DEVICE_ID`].
pub const SESSION_KEYS: [&str; 6] = [
    ACCESS_TOKEN,
    REFRESH_TOKEN,
    USER,
    EXPIRES_AT,
    REMEMBER_ME,
    LAST_ACTIVITY,
];

/// Cookie: access token (read by server-rendered components).
pub const COOKIE_TOKEN: &str = "velora_token";
/// Cookie: user role.
pub const COOKIE_ROLE: &str = "velora_role";
/// Cookie: absolute expiry, epoch milliseconds.
pub const COOKIE_EXPIRES: &str = "velora_expires";

/// Every session cookie.
pub const SESSION_COOKIES: [&str; 3] = [COOKIE_TOKEN, COOKIE_ROLE, COOKIE_EXPIRES];
