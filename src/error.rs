//! Failure taxonomy surfaced by [`ApiClient`](crate::api::ApiClient).

use reqwest::StatusCode;
use thiserror::Error;

use crate::credentials::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained from the server.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The access token was rejected and could not be refreshed. Stored
    /// credentials have already been cleared when this is returned.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Any non-2xx response other than the one that triggers a refresh,
    /// including a 401 on the retried request.
    #[error("server returned {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// A 2xx response whose non-empty body is not valid JSON.
    #[error("malformed response body: {source}")]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client itself could not be constructed (TLS backend setup).
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error(transparent)]
    Credentials(#[from] StoreError),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}
