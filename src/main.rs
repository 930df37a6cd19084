//! Velora session agent: composition root for the client session runtime.
//!
//! Wires the storage adapters, device-id provider, session store, validator,
//! and background watchdog together with explicit dependency injection,
//! then runs until interrupted.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use velora_backend::HttpAuthBackend;
use velora_core::config::AppConfig;
use velora_core::error::AppError;
use velora_core::traits::SystemClock;
use velora_session::{
    DeviceSignals, FingerprintDeviceId, RoutePolicy, SessionStore, SessionValidator,
    SessionWatchdog,
};
use velora_storage::{FileStore, MemoryCookieJar};

#[tokio::main]
async fn main() {
    let env = std::env::var("VELORA_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Session agent error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Velora session agent v{}", env!("CARGO_PKG_VERSION"));

    // Durable surface: JSON file store under the data directory.
    let storage = Arc::new(FileStore::open("data/session.json")?);

    // Cookie surface: in-process jar (HTTPS policy assumed for the shell).
    let cookies = Arc::new(MemoryCookieJar::new(true));

    // Device identifier from host signals.
    let device = Arc::new(FingerprintDeviceId::new(
        storage.clone(),
        host_device_signals(),
    ));

    let clock = Arc::new(SystemClock);

    let store = Arc::new(SessionStore::new(
        storage,
        cookies,
        device,
        clock.clone(),
        config.session.clone(),
    ));

    let backend = Arc::new(HttpAuthBackend::new(&config.backend)?);

    let validator = SessionValidator::new(
        store.clone(),
        backend,
        clock,
        RoutePolicy::marketplace_defaults(),
        config.session.clone(),
    );

    // Log every session change for observability.
    let mut events = store.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "Session event");
        }
    });

    // Initial validation, then hand over to the watchdog.
    let outcome = validator.validate_session(false).await;
    tracing::info!(state = ?outcome.state, message = %outcome.message, "Initial validation");

    let watchdog =
        SessionWatchdog::new(validator, config.session.watchdog_interval()).start();

    tracing::info!("Session agent running; press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::internal(format!("Signal handler failed: {e}")))?;

    watchdog.stop();
    tracing::info!("Session agent stopped");
    Ok(())
}

/// Environment signals for the device identifier, taken from the host.
fn host_device_signals() -> DeviceSignals {
    DeviceSignals {
        user_agent: format!("VeloraShell/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        language: std::env::var("LANG").unwrap_or_else(|_| "en-US".to_string()),
        screen_width: 1920,
        screen_height: 1080,
        timezone_offset_minutes: 0,
        renderer: std::env::consts::ARCH.to_string(),
    }
}
