//! External auth collaborator port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::User;

/// Replacement credentials returned by a successful refresh exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedTokens {
    /// The new access token.
    pub access_token: String,
    /// The new refresh token, superseding the one that was exchanged.
    pub refresh_token: String,
    /// Lifetime of the new access token in seconds.
    pub expires_in_seconds: u64,
}

/// The narrow contract the validator consumes from the auth service.
///
/// `Ok(None)` means the service answered and rejected the credential
/// (refresh token consumed, access token revoked); `Err` means the call
/// itself failed. The validator treats both as a failed attempt and never
/// retries within a single validation pass.
#[async_trait]
pub trait AuthBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Exchange a refresh token for a new token pair.
    async fn refresh_token(&self, refresh_token: &str) -> AppResult<Option<RefreshedTokens>>;

    /// Re-validate an access token server-side and fetch the current user.
    async fn get_current_user(&self, access_token: &str) -> AppResult<Option<User>>;
}
