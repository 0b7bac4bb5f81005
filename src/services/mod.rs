//! Typed helpers over the raw [`ApiClient`](crate::api::ApiClient) calls.

pub mod jobs;
