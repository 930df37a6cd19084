//! # velora-session
//!
//! Client session lifecycle for the Velora marketplace.
//!
//! ## Modules
//!
//! - `store` — dual-surface session persistence (durable store + cookies) with change broadcasts
//! - `validator` — single-flight validation state machine and token refresh orchestration
//! - `permissions` — role hierarchy checks and the static route permission table
//! - `device` — advisory device-identifier derivation
//! - `activity` — throttled activity recording
//! - `watchdog` — cancelable background validation timer

pub mod activity;
pub mod device;
pub mod keys;
pub mod permissions;
pub mod store;
pub mod validator;
pub mod watchdog;

pub use activity::ActivityTracker;
pub use device::{DeviceSignals, FingerprintDeviceId};
pub use permissions::{RoutePolicy, has_permission};
pub use store::SessionStore;
pub use validator::{LOGIN_ROUTE, SessionValidator, ValidationOutcome, ValidationState};
pub use watchdog::{SessionWatchdog, WatchdogHandle};
