//! Auth backend (external collaborator) configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the external auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the auth service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds for auth service calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    /// Request timeout as a std duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
