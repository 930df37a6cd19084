//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every field carries a serde default so a missing file yields
//! the platform's fixed policy.

pub mod backend;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

use self::backend::BackendConfig;
use self::logging::LoggingConfig;
use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session lifecycle policy.
    #[serde(default)]
    pub session: SessionConfig,
    /// Auth service connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `VELORA__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VELORA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_platform_policy() {
        let config = AppConfig::default();
        assert_eq!(config.session.access_token_ttl_hours, 24);
        assert_eq!(config.session.refresh_token_ttl_days, 7);
        assert_eq!(config.session.remember_me_ttl_days, 30);
        assert_eq!(config.session.inactivity_timeout_minutes, 15);
        assert_eq!(config.session.refresh_threshold_minutes, 5);
    }

    #[test]
    fn test_refresh_window_precedes_expiry() {
        let session = session::SessionConfig::default();
        assert!(session.refresh_threshold() > chrono::Duration::zero());
        assert!(session.refresh_threshold() < session.access_token_ttl());
    }
}
