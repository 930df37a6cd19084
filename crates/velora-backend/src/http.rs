//! HTTP implementation of the auth collaborator contract.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use velora_core::config::backend::BackendConfig;
use velora_core::error::AppError;
use velora_core::result::AppResult;
use velora_core::traits::{AuthBackend, RefreshedTokens};
use velora_core::types::User;

/// [`AuthBackend`] over the auth service's HTTP API.
///
/// A definitive rejection (401/403/404) maps to `Ok(None)`: the credential
/// is unusable. Transport problems and unexpected statuses map to `Err`;
/// the validator treats both the same way, but logs tell them apart.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    /// Shared HTTP client with the configured request timeout.
    client: reqwest::Client,
    /// Auth service base URL, no trailing slash.
    base_url: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
    refresh_token: String,
    expires_in: u64,
}

impl HttpAuthBackend {
    /// Builds the adapter from configuration.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    velora_core::error::ErrorKind::ExternalService,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Option<RefreshedTokens>> {
        let response = self
            .client
            .post(self.url("/api/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Refresh request failed: {e}")))?;

        match response.status() {
            StatusCode::OK => {
                let body: RefreshResponse = response.json().await.map_err(|e| {
                    AppError::external_service(format!("Malformed refresh response: {e}"))
                })?;
                debug!("Refresh exchange succeeded");
                Ok(Some(RefreshedTokens {
                    access_token: body.token,
                    refresh_token: body.refresh_token,
                    expires_in_seconds: body.expires_in,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!(status = %response.status(), "Refresh token rejected");
                Ok(None)
            }
            status => {
                warn!(status = %status, "Unexpected refresh response");
                Err(AppError::external_service(format!(
                    "Unexpected refresh status: {status}"
                )))
            }
        }
    }

    async fn get_current_user(&self, access_token: &str) -> AppResult<Option<User>> {
        let response = self
            .client
            .get(self.url("/api/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("User check failed: {e}")))?;

        match response.status() {
            StatusCode::OK => {
                let user: User = response.json().await.map_err(|e| {
                    AppError::external_service(format!("Malformed user response: {e}"))
                })?;
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!(status = %response.status(), "Access token rejected by user check");
                Ok(None)
            }
            status => {
                warn!(status = %status, "Unexpected user check response");
                Err(AppError::external_service(format!(
                    "Unexpected user check status: {status}"
                )))
            }
        }
    }
}
