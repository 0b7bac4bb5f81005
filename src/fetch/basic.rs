use super::client::HttpClient;
use crate::config::ClientConfig;
use async_trait::async_trait;

/// Default transport backed by a pooled [`reqwest::Client`].
#[derive(Clone)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds a client honouring the overall and connect timeouts in `config`.
    pub fn from_config(config: &ClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self(client))
    }

    /// The underlying client, used to assemble requests before they are executed.
    pub fn inner(&self) -> &reqwest::Client {
        &self.0
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
