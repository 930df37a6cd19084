//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use velora_core::config::session::SessionConfig;
use velora_core::result::AppResult;
use velora_core::traits::{AuthBackend, Clock, KeyValueStore, RefreshedTokens};
use velora_core::types::{User, UserRole};
use velora_session::{DeviceSignals, FingerprintDeviceId, RoutePolicy, SessionStore, SessionValidator};
use velora_storage::{MemoryCookieJar, MemoryStore};

/// Controllable clock. Starts at the wall clock truncated to milliseconds,
/// matching the persistence precision so round-trips compare exactly.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    pub fn new() -> Arc<Self> {
        let millis = Utc::now().timestamp_millis();
        let now = Utc.timestamp_millis_opt(millis).unwrap();
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// What the mock auth service answers to a refresh exchange.
#[derive(Debug, Clone, Copy)]
pub enum RefreshReply {
    /// Issue a new pair with this access-token lifetime.
    Accept { expires_in_seconds: u64 },
    /// Answer definitively: the refresh token is unusable.
    Reject,
    /// Fail the call itself (transport error).
    Fail,
}

/// Scriptable [`AuthBackend`] that counts calls.
#[derive(Debug)]
pub struct MockAuthBackend {
    pub refresh_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    refresh_reply: Mutex<RefreshReply>,
    user_reply: Mutex<Option<User>>,
    refresh_delay: std::time::Duration,
}

impl MockAuthBackend {
    pub fn new(reply: RefreshReply) -> Arc<Self> {
        Arc::new(Self {
            refresh_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            refresh_reply: Mutex::new(reply),
            user_reply: Mutex::new(None),
            refresh_delay: std::time::Duration::ZERO,
        })
    }

    /// Like [`Self::new`], but each refresh call stalls for `delay` so tests
    /// can overlap concurrent validations.
    pub fn with_delay(reply: RefreshReply, delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            refresh_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
            refresh_reply: Mutex::new(reply),
            user_reply: Mutex::new(None),
            refresh_delay: delay,
        })
    }

    pub fn set_refresh_reply(&self, reply: RefreshReply) {
        *self.refresh_reply.lock().unwrap() = reply;
    }

    /// What `get_current_user` answers; `None` means revoked.
    pub fn set_user_reply(&self, user: Option<User>) {
        *self.user_reply.lock().unwrap() = user;
    }

    pub fn refresh_call_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn refresh_token(&self, _refresh_token: &str) -> AppResult<Option<RefreshedTokens>> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        match *self.refresh_reply.lock().unwrap() {
            RefreshReply::Accept { expires_in_seconds } => Ok(Some(RefreshedTokens {
                access_token: format!("access-{call}"),
                refresh_token: format!("refresh-{call}"),
                expires_in_seconds,
            })),
            RefreshReply::Reject => Ok(None),
            RefreshReply::Fail => Err(velora_core::AppError::external_service(
                "mock transport failure",
            )),
        }
    }

    async fn get_current_user(&self, _access_token: &str) -> AppResult<Option<User>> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.user_reply.lock().unwrap().clone())
    }
}

/// A store wrapper whose writes start failing after a set count, for
/// exercising the save-failure path.
#[derive(Debug)]
pub struct FlakyStore {
    inner: MemoryStore,
    writes_before_failure: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_after(writes: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            writes_before_failure: AtomicUsize::new(writes),
        })
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let remaining = self.writes_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(velora_core::AppError::storage("simulated quota exceeded"));
        }
        self.writes_before_failure.store(remaining - 1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }
}

pub fn test_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        username: "mika".into(),
        email: "mika@example.com".into(),
        display_name: Some("Mika V.".into()),
        role,
    }
}

pub fn device_signals() -> DeviceSignals {
    DeviceSignals {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) TestShell".into(),
        language: "en-US".into(),
        screen_width: 1920,
        screen_height: 1080,
        timezone_offset_minutes: -60,
        renderer: "test-renderer".into(),
    }
}

/// Everything a test needs, sharing one storage and one clock.
pub struct TestEnv {
    pub storage: Arc<MemoryStore>,
    pub cookies: Arc<MemoryCookieJar>,
    pub clock: Arc<MockClock>,
    pub store: Arc<SessionStore>,
    pub config: SessionConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStore::new());
        let cookies = Arc::new(MemoryCookieJar::new(true));
        let clock = MockClock::new();
        let config = SessionConfig::default();
        let device = Arc::new(FingerprintDeviceId::new(storage.clone(), device_signals()));

        let store = Arc::new(SessionStore::new(
            storage.clone(),
            cookies.clone(),
            device,
            clock.clone(),
            config.clone(),
        ));

        Self {
            storage,
            cookies,
            clock,
            store,
            config,
        }
    }

    pub fn validator(&self, backend: Arc<MockAuthBackend>) -> SessionValidator {
        SessionValidator::new(
            self.store.clone(),
            backend,
            self.clock.clone(),
            RoutePolicy::marketplace_defaults(),
            self.config.clone(),
        )
    }

    /// Persist a session expiring at `now + ttl` for `role`.
    pub fn save_session_expiring_in(&self, role: UserRole, ttl: chrono::Duration) -> User {
        let user = test_user(role);
        let expires_at = self.clock.now() + ttl;
        self.store
            .save_session(&user, "access-0", "refresh-0", expires_at, false)
            .unwrap();
        user
    }
}
