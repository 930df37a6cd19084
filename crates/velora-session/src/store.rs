//! Dual-surface session persistence.
//!
//! The [`SessionStore`] is the single source of truth for "is there a
//! session, and what does it contain". Every mutation is replicated to two
//! surfaces, the durable key/value store (for the client itself) and the
//! cookie surface (for server-rendered components), and announced on a
//! broadcast channel. Nothing else in the system writes either surface.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use velora_core::config::session::SessionConfig;
use velora_core::error::AppError;
use velora_core::events::SessionEvent;
use velora_core::result::AppResult;
use velora_core::traits::{Clock, CookieJar, DeviceIdProvider, KeyValueStore};
use velora_core::types::{Session, SessionInfo, User};

use crate::keys;

/// Durable persistence of the current session across both surfaces.
#[derive(Clone)]
pub struct SessionStore {
    /// Durable key/value surface.
    storage: Arc<dyn KeyValueStore>,
    /// Cookie surface.
    cookies: Arc<dyn CookieJar>,
    /// Device identifier provider.
    device: Arc<dyn DeviceIdProvider>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Lifecycle policy.
    config: SessionConfig,
    /// Session-change notifications.
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionStore {
    /// Creates a store over the given surfaces.
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieJar>,
        device: Arc<dyn DeviceIdProvider>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer_size);
        Self {
            storage,
            cookies,
            device,
            clock,
            config,
            events,
        }
    }

    /// Subscribe to session-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The lifecycle policy this store was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Persists a complete session on both surfaces.
    ///
    /// This is the only mutator that surfaces storage failure: a failed save
    /// means "login succeeded but the session was not persisted", which the
    /// caller must see. On any partial failure the store is restored to the
    /// cleared state before the error is returned, so the two surfaces never
    /// disagree.
    pub fn save_session(
        &self,
        user: &User,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) -> AppResult<()> {
        let result = self.write_session(user, access_token, refresh_token, expires_at, remember_me);

        if let Err(e) = result {
            warn!(error = %e, "Session save failed, restoring cleared state");
            self.clear_session();
            return Err(e);
        }

        info!(
            user_id = %user.id,
            role = %user.role,
            remember_me,
            expires_at = %expires_at,
            "Session saved"
        );

        let _ = self.events.send(SessionEvent::Saved {
            user: user.clone(),
            expires_at,
            remember_me,
        });

        Ok(())
    }

    fn write_session(
        &self,
        user: &User,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) -> AppResult<()> {
        let now = self.clock.now();
        let user_json = serde_json::to_string(user)?;

        // Make sure the device id exists before the session keys; it must
        // outlive them.
        self.device.device_id()?;

        self.storage.set(keys::ACCESS_TOKEN, access_token)?;
        self.storage.set(keys::REFRESH_TOKEN, refresh_token)?;
        self.storage.set(keys::USER, &user_json)?;
        self.storage
            .set(keys::EXPIRES_AT, &expires_at.timestamp_millis().to_string())?;
        self.storage
            .set(keys::REMEMBER_ME, if remember_me { "true" } else { "false" })?;
        self.storage
            .set(keys::LAST_ACTIVITY, &now.timestamp_millis().to_string())?;

        self.write_cookies(access_token, user.role.to_string().as_str(), expires_at, remember_me)
    }

    fn write_cookies(
        &self,
        access_token: &str,
        role: &str,
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) -> AppResult<()> {
        let cookie_expiry = self.cookie_expiry(expires_at, remember_me);
        self.cookies
            .set(keys::COOKIE_TOKEN, access_token, cookie_expiry)?;
        self.cookies.set(keys::COOKIE_ROLE, role, cookie_expiry)?;
        self.cookies.set(
            keys::COOKIE_EXPIRES,
            &expires_at.timestamp_millis().to_string(),
            cookie_expiry,
        )?;
        Ok(())
    }

    /// Cookie retention window: remember-me extends storage life, it never
    /// extends the access token itself.
    fn cookie_expiry(&self, expires_at: DateTime<Utc>, remember_me: bool) -> DateTime<Utc> {
        if remember_me {
            self.clock.now() + self.config.remember_me_ttl()
        } else {
            expires_at
        }
    }

    /// Reconstructs the session from the durable surface.
    ///
    /// `Ok(None)` is legitimate absence (no session keys at all). Corrupt or
    /// incomplete state is different: the store self-heals with a full clear
    /// and reports the corruption, so callers and tests can tell the two
    /// apart.
    pub fn load_session(&self) -> AppResult<Option<Session>> {
        let access_token = self.storage.get(keys::ACCESS_TOKEN)?;
        let refresh_token = self.storage.get(keys::REFRESH_TOKEN)?;
        let user_json = self.storage.get(keys::USER)?;
        let expires_raw = self.storage.get(keys::EXPIRES_AT)?;
        let last_activity_raw = self.storage.get(keys::LAST_ACTIVITY)?;

        let (access_token, refresh_token, user_json, expires_raw, last_activity_raw) = match (
            access_token,
            refresh_token,
            user_json,
            expires_raw,
            last_activity_raw,
        ) {
            (None, None, None, None, None) => return Ok(None),
            (Some(a), Some(r), Some(u), Some(e), Some(l)) => (a, r, u, e, l),
            _ => {
                warn!("Incomplete session state, clearing");
                self.clear_session();
                return Err(AppError::session("Incomplete session state"));
            }
        };

        let parsed = (|| -> Option<(User, DateTime<Utc>, DateTime<Utc>)> {
            let user = serde_json::from_str::<User>(&user_json).ok()?;
            let expires_at = parse_millis(&expires_raw)?;
            let last_activity = parse_millis(&last_activity_raw)?;
            Some((user, expires_at, last_activity))
        })();

        let Some((user, expires_at, last_activity)) = parsed else {
            warn!("Unparsable session state, clearing");
            self.clear_session();
            return Err(AppError::session("Unparsable session state"));
        };

        let remember_me = self
            .storage
            .get(keys::REMEMBER_ME)?
            .is_some_and(|v| v == "true");

        let device_id = self.device.device_id()?;

        Ok(Some(Session {
            user,
            access_token,
            refresh_token,
            expires_at,
            remember_me,
            device_id,
            last_activity,
        }))
    }

    /// Replaces the user snapshot and the role cookie; touches activity.
    ///
    /// Best-effort: the snapshot is a refresh of already-persisted state, so
    /// failure is logged and swallowed rather than surfaced.
    pub fn update_user(&self, user: &User) {
        let result = (|| -> AppResult<()> {
            let user_json = serde_json::to_string(user)?;
            self.storage.set(keys::USER, &user_json)?;

            if let (Some(expires_at), remember_me) = (self.stored_expiry(), self.remember_me()) {
                let cookie_expiry = self.cookie_expiry(expires_at, remember_me);
                self.cookies
                    .set(keys::COOKIE_ROLE, &user.role.to_string(), cookie_expiry)?;
            }

            self.touch_activity()
        })();

        match result {
            Ok(()) => {
                debug!(user_id = %user.id, role = %user.role, "User snapshot updated");
                let _ = self.events.send(SessionEvent::UserUpdated { user: user.clone() });
            }
            Err(e) => warn!(error = %e, "User snapshot update failed"),
        }
    }

    /// Replaces the token pair and expiry on both surfaces; touches activity.
    ///
    /// Best-effort, same as [`Self::update_user`].
    pub fn update_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) {
        let result = (|| -> AppResult<()> {
            self.storage.set(keys::ACCESS_TOKEN, access_token)?;
            self.storage.set(keys::REFRESH_TOKEN, refresh_token)?;
            self.storage
                .set(keys::EXPIRES_AT, &expires_at.timestamp_millis().to_string())?;

            let remember_me = self.remember_me();
            let cookie_expiry = self.cookie_expiry(expires_at, remember_me);
            self.cookies
                .set(keys::COOKIE_TOKEN, access_token, cookie_expiry)?;
            self.cookies.set(
                keys::COOKIE_EXPIRES,
                &expires_at.timestamp_millis().to_string(),
                cookie_expiry,
            )?;

            self.touch_activity()
        })();

        match result {
            Ok(()) => {
                debug!(expires_at = %expires_at, "Tokens rotated");
                let _ = self.events.send(SessionEvent::TokensUpdated { expires_at });
            }
            Err(e) => warn!(error = %e, "Token rotation persist failed"),
        }
    }

    /// Stamps the last-activity timestamp.
    ///
    /// Called explicitly by the validator's pass-through branch and from the
    /// throttled activity tracker. Best-effort.
    pub fn update_last_activity(&self) {
        if let Err(e) = self.touch_activity() {
            warn!(error = %e, "Activity touch failed");
        }
    }

    fn touch_activity(&self) -> AppResult<()> {
        let now = self.clock.now();
        self.storage
            .set(keys::LAST_ACTIVITY, &now.timestamp_millis().to_string())
    }

    /// Removes every session key and every cookie; the device id survives.
    ///
    /// Idempotent: clearing an empty store still broadcasts `Cleared` and
    /// nothing else.
    pub fn clear_session(&self) {
        for key in keys::SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
            }
        }
        for cookie in keys::SESSION_COOKIES {
            if let Err(e) = self.cookies.remove(cookie) {
                warn!(cookie, error = %e, "Failed to remove session cookie");
            }
        }

        debug!("Session cleared");
        let _ = self.events.send(SessionEvent::Cleared);
    }

    /// Whether any session is stored. Never errors.
    pub fn has_session(&self) -> bool {
        matches!(self.storage.get(keys::ACCESS_TOKEN), Ok(Some(_)))
    }

    /// The stored access token, if any. Never errors.
    pub fn get_access_token(&self) -> Option<String> {
        self.storage.get(keys::ACCESS_TOKEN).ok().flatten()
    }

    /// The stored refresh token, if any. Never errors.
    pub fn get_refresh_token(&self) -> Option<String> {
        self.storage.get(keys::REFRESH_TOKEN).ok().flatten()
    }

    /// The stored user snapshot, if present and readable. Never errors.
    pub fn get_current_user(&self) -> Option<User> {
        let raw = self.storage.get(keys::USER).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    /// `now >= expires_at`. A missing or unreadable expiry counts as expired.
    pub fn is_session_expired(&self) -> bool {
        match self.stored_expiry() {
            Some(expires_at) => self.clock.now() >= expires_at,
            None => true,
        }
    }

    /// `now >= expires_at - refresh_threshold`. The window opens strictly
    /// before hard expiry for any positive threshold.
    pub fn needs_refresh(&self) -> bool {
        match self.stored_expiry() {
            Some(expires_at) => self.clock.now() >= expires_at - self.config.refresh_threshold(),
            None => true,
        }
    }

    /// `now - last_activity > inactivity_timeout`. A missing timestamp counts
    /// as inactive.
    pub fn is_inactive(&self) -> bool {
        match self.stored_last_activity() {
            Some(last_activity) => {
                self.clock.now() - last_activity > self.config.inactivity_timeout()
            }
            None => true,
        }
    }

    /// Diagnostic snapshot of the timing predicates. Observability only;
    /// the validator never consults this.
    pub fn get_session_info(&self) -> SessionInfo {
        let has_session = self.has_session();
        let expires_in_ms = self
            .stored_expiry()
            .map(|expires_at| (expires_at - self.clock.now()).num_milliseconds())
            .unwrap_or(0);

        SessionInfo {
            has_session,
            is_expired: self.is_session_expired(),
            needs_refresh: self.needs_refresh(),
            is_inactive: self.is_inactive(),
            expires_in_ms,
        }
    }

    fn stored_expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(keys::EXPIRES_AT).ok().flatten()?;
        parse_millis(&raw)
    }

    fn stored_last_activity(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(keys::LAST_ACTIVITY).ok().flatten()?;
        parse_millis(&raw)
    }

    fn remember_me(&self) -> bool {
        self.storage
            .get(keys::REMEMBER_ME)
            .ok()
            .flatten()
            .is_some_and(|v| v == "true")
    }
}

fn parse_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}
