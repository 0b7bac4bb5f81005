use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ApiClient;
use crate::config::RefreshPolicy;
use crate::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::ApiError;
use crate::session::{LOGIN_ROUTE, Notification};

/// Endpoint exchanging a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/token/refresh/";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    // Present when the server rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

enum RefreshOutcome {
    Refreshed(String),
    Failed(String),
}

impl ApiClient {
    /// Obtains a usable access token after `rejected` got a 401, expiring the
    /// session when none can be had.
    pub(super) async fn recover_session(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        match self.config.refresh_policy {
            RefreshPolicy::Independent => self.refresh_or_expire().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;
                match self.store.get_item(ACCESS_TOKEN_KEY).await? {
                    Some(current) if Some(current.as_str()) != rejected => {
                        debug!("Access token already refreshed by another call");
                        Ok(current)
                    }
                    // Cleared while waiting: another call already expired the
                    // session and told the host.
                    None if rejected.is_some() => {
                        debug!("Session already expired by another call");
                        Err(ApiError::SessionExpired)
                    }
                    _ => self.refresh_or_expire().await,
                }
            }
        }
    }

    async fn refresh_or_expire(&self) -> Result<String, ApiError> {
        match self.refresh_access_token().await? {
            RefreshOutcome::Refreshed(token) => Ok(token),
            RefreshOutcome::Failed(reason) => {
                warn!(reason = %reason, "Token refresh failed");
                self.expire_session().await;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Runs one refresh exchange. Only credential-store failures are errors;
    /// everything the server or network does wrong is a `Failed` outcome.
    async fn refresh_access_token(&self) -> Result<RefreshOutcome, ApiError> {
        let Some(refresh_token) = self.store.get_item(REFRESH_TOKEN_KEY).await? else {
            return Ok(RefreshOutcome::Failed("no refresh token stored".into()));
        };

        let request = match self
            .http
            .post(self.config.url_for(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: &refresh_token,
            })
            .build()
        {
            Ok(request) => request,
            Err(e) => return Ok(RefreshOutcome::Failed(format!("invalid refresh request: {e}"))),
        };

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => return Ok(RefreshOutcome::Failed(format!("refresh request failed: {e}"))),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Ok(RefreshOutcome::Failed(format!(
                "refresh rejected with status {status}: {body}"
            )));
        }

        let tokens: RefreshResponse = match response.json().await {
            Ok(tokens) => tokens,
            Err(e) => {
                return Ok(RefreshOutcome::Failed(format!(
                    "unreadable refresh response: {e}"
                )));
            }
        };

        self.store.set_item(ACCESS_TOKEN_KEY, &tokens.access).await?;
        if let Some(rotated) = tokens.refresh.as_deref() {
            self.store.set_item(REFRESH_TOKEN_KEY, rotated).await?;
        }

        info!(rotated = tokens.refresh.is_some(), "Access token refreshed");
        Ok(RefreshOutcome::Refreshed(tokens.access))
    }

    /// Clears stored credentials and tells the host the session is over.
    async fn expire_session(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.delete_item(key).await {
                warn!(key, error = %e, "Failed to clear credential");
            }
        }
        warn!("Session expired, returning to login");
        self.notifier.notify(Notification::session_expired());
        self.navigator.replace_route(LOGIN_ROUTE);
    }
}
