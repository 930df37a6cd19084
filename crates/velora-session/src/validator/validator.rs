//! The session validation state machine.
//!
//! One decision procedure over the persisted session and the current time.
//! Validations coalesce: callers arriving while a pass is in flight await
//! the same future and receive the same outcome, so a single refresh token
//! is never spent twice by racing callers.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use velora_core::config::session::SessionConfig;
use velora_core::traits::{AuthBackend, Clock, RefreshedTokens};
use velora_core::types::{User, UserRole};

use crate::permissions::{self, RoutePolicy};
use crate::store::SessionStore;

use super::outcome::{ValidationOutcome, ValidationState};

type SharedValidation = Shared<BoxFuture<'static, ValidationOutcome>>;

/// Decides what to do with the stored session, refreshing tokens against
/// the auth backend when the state machine demands it.
///
/// Cheap to clone; clones share the store, the backend, and the
/// single-flight gate. The application's composition root constructs
/// exactly one and hands it down.
#[derive(Clone)]
pub struct SessionValidator {
    /// The session store (sole writer of persisted state).
    store: Arc<SessionStore>,
    /// External auth collaborator.
    backend: Arc<dyn AuthBackend>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Route permission table.
    routes: Arc<RoutePolicy>,
    /// Lifecycle policy.
    config: SessionConfig,
    /// In-flight validation, tagged with a generation so a finished pass
    /// only clears its own slot.
    in_flight: Arc<Mutex<FlightSlot>>,
}

/// Single-flight bookkeeping.
#[derive(Default)]
struct FlightSlot {
    /// Monotonic pass counter.
    generation: u64,
    /// The pass currently in flight, if any.
    current: Option<(u64, SharedValidation)>,
}

impl std::fmt::Debug for SessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidator")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionValidator {
    /// Creates a validator over the given store and auth backend.
    pub fn new(
        store: Arc<SessionStore>,
        backend: Arc<dyn AuthBackend>,
        clock: Arc<dyn Clock>,
        routes: RoutePolicy,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            backend,
            clock,
            routes: Arc::new(routes),
            config,
            in_flight: Arc::new(Mutex::new(FlightSlot::default())),
        }
    }

    /// Runs one validation pass, coalescing concurrent callers.
    ///
    /// With `force_refresh = false`, a caller arriving while a pass is in
    /// flight awaits that pass instead of starting another. With
    /// `force_refresh = true` a fresh pass always starts (and replaces the
    /// shared slot), performing both a token refresh and a server-side user
    /// re-check.
    pub async fn validate_session(&self, force_refresh: bool) -> ValidationOutcome {
        let fut = {
            let mut slot = lock_slot(&self.in_flight);

            let joinable = match slot.current.as_ref() {
                Some((_, existing)) if !force_refresh => Some(existing.clone()),
                _ => None,
            };

            match joinable {
                Some(existing) => {
                    debug!("Joining in-flight validation");
                    existing
                }
                None => self.spawn_pass(&mut slot, force_refresh),
            }
        };

        fut.await
    }

    fn spawn_pass(&self, slot: &mut FlightSlot, force_refresh: bool) -> SharedValidation {
        slot.generation += 1;
        let generation = slot.generation;

        let this = self.clone();
        let fut: SharedValidation = async move {
            let outcome = this.run_pass(force_refresh).await;

            // Only clear the slot if it still holds this pass; a forced
            // pass may have replaced it in the meantime.
            let mut slot = lock_slot(&this.in_flight);
            if matches!(slot.current.as_ref(), Some((g, _)) if *g == generation) {
                slot.current = None;
            }

            outcome
        }
        .boxed()
        .shared();

        slot.current = Some((generation, fut.clone()));
        fut
    }

    /// The decision procedure proper. Check order is part of the contract:
    /// hard expiry, then inactivity, then the refresh window. Reordering
    /// would, for example, silently re-authenticate an inactive user.
    async fn run_pass(&self, force_refresh: bool) -> ValidationOutcome {
        let session = match self.store.load_session() {
            Ok(Some(session)) => session,
            Ok(None) => {
                return ValidationOutcome::login_redirect(
                    ValidationState::NoSession,
                    "No session found",
                );
            }
            Err(e) => {
                warn!(error = %e, "Stored session unreadable, treating as absent");
                return ValidationOutcome::login_redirect(
                    ValidationState::NoSession,
                    "Stored session was unreadable",
                );
            }
        };

        let now = self.clock.now();

        // Hard expiry: exactly one repair attempt.
        if session.is_expired_at(now) {
            return match self.attempt_refresh(&session.refresh_token).await {
                Some(tokens) => {
                    let expires_at = self.clock.now()
                        + chrono::Duration::seconds(tokens.expires_in_seconds as i64);
                    self.store
                        .update_tokens(&tokens.access_token, &tokens.refresh_token, expires_at);
                    info!(user_id = %session.user.id, "Expired session repaired by refresh");
                    ValidationOutcome::alive(
                        ValidationState::RefreshNeeded,
                        session.user,
                        tokens.access_token,
                        expires_at,
                        "Session was expired and has been refreshed",
                    )
                }
                None => {
                    warn!(user_id = %session.user.id, "Refresh of expired session failed");
                    self.store.clear_session();
                    ValidationOutcome::login_redirect(
                        ValidationState::RefreshFailed,
                        "Session expired and could not be refreshed",
                    )
                }
            };
        }

        // Inactivity precedes the refresh window: an inactive-but-unexpired
        // session is logged out, never silently refreshed.
        if session.is_inactive_at(now, self.config.inactivity_timeout()) {
            info!(user_id = %session.user.id, "Session inactive, logging out");
            self.store.clear_session();
            return ValidationOutcome::login_redirect(
                ValidationState::Inactive,
                "Session ended due to inactivity",
            );
        }

        let mut session = session;

        // Proactive refresh window, or an explicitly forced refresh.
        if session.needs_refresh_at(now, self.config.refresh_threshold()) || force_refresh {
            match self.attempt_refresh(&session.refresh_token).await {
                Some(tokens) => {
                    let expires_at = self.clock.now()
                        + chrono::Duration::seconds(tokens.expires_in_seconds as i64);
                    self.store
                        .update_tokens(&tokens.access_token, &tokens.refresh_token, expires_at);
                    debug!(user_id = %session.user.id, "Tokens proactively refreshed");
                    session.access_token = tokens.access_token;
                    session.refresh_token = tokens.refresh_token;
                    session.expires_at = expires_at;
                }
                None => {
                    // Transient failure before hard expiry keeps the
                    // existing tokens. Past expiry there is nothing left
                    // to fall back to.
                    if self.clock.now() >= session.expires_at {
                        warn!(user_id = %session.user.id, "Refresh failed with token past expiry");
                        self.store.clear_session();
                        return ValidationOutcome::login_redirect(
                            ValidationState::RefreshFailed,
                            "Token refresh failed after expiry",
                        );
                    }
                    warn!(
                        user_id = %session.user.id,
                        "Refresh failed, keeping existing tokens until expiry"
                    );
                }
            }

            if force_refresh {
                match self.recheck_user(&session.access_token, &session.user).await {
                    UserRecheck::Revoked => {
                        info!(user_id = %session.user.id, "Server no longer recognizes session");
                        self.store.clear_session();
                        return ValidationOutcome::login_redirect(
                            ValidationState::Invalid,
                            "Session rejected by the auth service",
                        );
                    }
                    UserRecheck::Updated(user) => {
                        self.store.update_user(&user);
                        session.user = user;
                    }
                    UserRecheck::Unchanged | UserRecheck::Unavailable => {}
                }
            }

            return ValidationOutcome::alive(
                ValidationState::Valid,
                session.user,
                session.access_token,
                session.expires_at,
                "Session is valid",
            );
        }

        // Healthy pass-through.
        self.store.update_last_activity();
        ValidationOutcome::alive(
            ValidationState::Valid,
            session.user,
            session.access_token,
            session.expires_at,
            "Session is valid",
        )
    }

    /// One bounded refresh attempt. Timeouts, transport failures, and
    /// rejections all collapse to `None`; the pass never retries.
    async fn attempt_refresh(&self, refresh_token: &str) -> Option<RefreshedTokens> {
        let call = self.backend.refresh_token(refresh_token);
        match tokio::time::timeout(self.config.refresh_call_timeout(), call).await {
            Ok(Ok(Some(tokens))) => Some(tokens),
            Ok(Ok(None)) => {
                debug!("Refresh token rejected by auth service");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Refresh call failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_seconds = self.config.refresh_call_timeout_seconds,
                    "Refresh call timed out"
                );
                None
            }
        }
    }

    async fn recheck_user(&self, access_token: &str, cached: &User) -> UserRecheck {
        match self.backend.get_current_user(access_token).await {
            Ok(Some(user)) if &user != cached => UserRecheck::Updated(user),
            Ok(Some(_)) => UserRecheck::Unchanged,
            Ok(None) => UserRecheck::Revoked,
            Err(e) => {
                warn!(error = %e, "User re-check unavailable, keeping cached snapshot");
                UserRecheck::Unavailable
            }
        }
    }

    /// Storage-only variant of the decision tree for per-render guards.
    ///
    /// Never calls the auth backend and never mutates the store: where the
    /// async path would refresh, this returns [`ValidationState::Expired`]
    /// or [`ValidationState::RefreshNeeded`] and leaves the actual repair to
    /// the caller's next [`Self::validate_session`].
    pub fn quick_validate(&self) -> ValidationOutcome {
        let session = match self.store.load_session() {
            Ok(Some(session)) => session,
            Ok(None) => {
                return ValidationOutcome::login_redirect(
                    ValidationState::NoSession,
                    "No session found",
                );
            }
            Err(_) => {
                return ValidationOutcome::login_redirect(
                    ValidationState::NoSession,
                    "Stored session was unreadable",
                );
            }
        };

        let now = self.clock.now();

        if session.is_expired_at(now) {
            return ValidationOutcome::deferred(
                ValidationState::Expired,
                "Session expired; run a full validation to refresh",
            );
        }

        if session.is_inactive_at(now, self.config.inactivity_timeout()) {
            return ValidationOutcome::login_redirect(
                ValidationState::Inactive,
                "Session is inactive; run a full validation to log out",
            );
        }

        if session.needs_refresh_at(now, self.config.refresh_threshold()) {
            return ValidationOutcome::deferred(
                ValidationState::RefreshNeeded,
                "Refresh window open; run a full validation to refresh",
            );
        }

        ValidationOutcome::alive(
            ValidationState::Valid,
            session.user,
            session.access_token,
            session.expires_at,
            "Session is valid",
        )
    }

    /// Role hierarchy check; see [`permissions::has_permission`].
    pub fn has_permission(&self, user: Option<&User>, required: UserRole) -> bool {
        permissions::has_permission(user, required)
    }

    /// Route table check; see [`RoutePolicy::can_access`].
    pub fn can_access_route(&self, user: Option<&User>, route: &str) -> bool {
        self.routes.can_access(user, route)
    }
}

/// Locks the single-flight slot, recovering from a poisoned lock: the slot
/// only holds bookkeeping, so the stale entry is still safe to read.
fn lock_slot(slot: &Mutex<FlightSlot>) -> std::sync::MutexGuard<'_, FlightSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Result of the forced server-side user re-check.
enum UserRecheck {
    /// Snapshot matches the server.
    Unchanged,
    /// Server returned a different payload.
    Updated(User),
    /// Server no longer recognizes the token.
    Revoked,
    /// The re-check call itself failed; cached snapshot stands.
    Unavailable,
}
