use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiClient;
use crate::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::ApiError;

/// Endpoint exchanging user credentials for a token pair.
pub const LOGIN_PATH: &str = "/token/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

impl ApiClient {
    /// Exchanges `username`/`password` for a token pair and stores both.
    ///
    /// Runs unauthenticated and never enters the refresh cycle; a rejected
    /// login is an [`ApiError::Http`].
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.config.url_for(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ApiError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            return Err(ApiError::Http { status, body });
        }

        let tokens: TokenPair = match serde_json::from_str(&body) {
            Ok(tokens) => tokens,
            Err(source) => return Err(ApiError::MalformedResponse { body, source }),
        };

        self.store.set_item(ACCESS_TOKEN_KEY, &tokens.access).await?;
        self.store.set_item(REFRESH_TOKEN_KEY, &tokens.refresh).await?;

        info!("Logged in");
        Ok(())
    }

    /// Forgets both stored tokens. The server is not contacted.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store.delete_item(ACCESS_TOKEN_KEY).await?;
        self.store.delete_item(REFRESH_TOKEN_KEY).await?;
        info!("Logged out");
        Ok(())
    }

    /// Whether an access token is currently stored.
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        Ok(self.store.get_item(ACCESS_TOKEN_KEY).await?.is_some())
    }
}
