//! Authenticated client for the LiveTakeoff REST API.
//!
//! Every call reads the stored access token, attaches it as
//! `Authorization: JWT <token>` and sends the request. A `401` on the first
//! attempt triggers one refresh through `/token/refresh/` followed by one
//! retry of the original request; whatever the retry returns is final. When
//! the refresh cannot happen the session is expired: both tokens are
//! cleared, the host is notified and sent to the login route, and the call
//! fails with [`ApiError::SessionExpired`].

mod auth;
mod refresh;

pub use auth::LOGIN_PATH;
pub use refresh::REFRESH_PATH;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::{ACCESS_TOKEN_KEY, CredentialStore};
use crate::error::ApiError;
use crate::fetch::auth::authorization_value;
use crate::fetch::{BasicClient, HttpClient};
use crate::request::{RequestBody, RequestConfig, build_headers};
use crate::session::{Navigator, NoopNavigator, Notifier, TracingNotifier};

/// Cheap to clone; clones share the transport, the credential store and the
/// refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    transport: Arc<dyn HttpClient>,
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ApiClient {
    /// Creates a client sending requests through a [`BasicClient`] built from
    /// `config`, logging notifications and ignoring navigation.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let basic = BasicClient::from_config(&config).map_err(ApiError::ClientBuild)?;
        Ok(Self {
            config: Arc::new(config),
            http: basic.inner().clone(),
            transport: Arc::new(basic),
            store,
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoopNavigator),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Replaces the transport that executes requests.
    pub fn with_transport(mut self, transport: impl HttpClient + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub async fn get(&self, path: &str, config: Option<RequestConfig>) -> Result<Value, ApiError> {
        self.request(path, Method::GET, None, config).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Option<RequestBody>,
        config: Option<RequestConfig>,
    ) -> Result<Value, ApiError> {
        self.request(path, Method::POST, body, config).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Option<RequestBody>,
        config: Option<RequestConfig>,
    ) -> Result<Value, ApiError> {
        self.request(path, Method::PUT, body, config).await
    }

    pub async fn delete(
        &self,
        path: &str,
        config: Option<RequestConfig>,
    ) -> Result<Value, ApiError> {
        self.request(path, Method::DELETE, None, config).await
    }

    /// Performs one logical call.
    ///
    /// Returns the parsed JSON body, or [`Value::Null`] when the body is empty.
    #[tracing::instrument(skip(self, body, config), fields(method = %method))]
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<RequestBody>,
        config: Option<RequestConfig>,
    ) -> Result<Value, ApiError> {
        let config = config.unwrap_or_default();
        let access = self.store.get_item(ACCESS_TOKEN_KEY).await?;

        let response = self
            .send(&method, path, body.as_ref(), access.as_deref(), &config)
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Access token rejected, refreshing");
            let fresh = self.recover_session(access.as_deref()).await?;
            self.send(&method, path, body.as_ref(), Some(&fresh), &config)
                .await?
        } else {
            response
        };

        read_body(response).await
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&RequestBody>,
        token: Option<&str>,
        config: &RequestConfig,
    ) -> Result<Response, ApiError> {
        let url = self.config.url_for(path);
        let authorization = token.map(authorization_value).transpose()?;
        let headers = build_headers(method, body, authorization, config)?;

        let mut builder = self.http.request(method.clone(), &url).headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match body {
            None => builder,
            Some(RequestBody::Json(value)) => {
                let encoded = serde_json::to_vec(value)
                    .map_err(|e| ApiError::InvalidRequest(format!("body is not serialisable: {e}")))?;
                builder.body(encoded)
            }
            Some(RequestBody::Multipart(payload)) => builder.multipart(payload.to_form()?),
            Some(RequestBody::Binary { bytes, .. }) => builder.body(bytes.clone()),
        };

        let request = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        debug!(url = %request.url(), authenticated = token.is_some(), "Sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ApiError::Network)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

/// Turns a final response into the call's result.
async fn read_body(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(ApiError::Network)?;

    if !status.is_success() {
        return Err(ApiError::Http { status, body: text });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(source) => Err(ApiError::MalformedResponse { body: text, source }),
    }
}
