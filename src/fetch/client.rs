use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam used by [`ApiClient`](crate::api::ApiClient).
///
/// Implementations only ship a fully built request over the wire. Header
/// injection, refresh and retry all happen above this layer, so a wrapper
/// here sees every attempt, including the refresh call and the retried
/// request.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
