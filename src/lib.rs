pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod output;
pub mod request;
pub mod services;
pub mod session;

pub use api::ApiClient;
pub use config::{ClientConfig, RefreshPolicy};
pub use error::ApiError;
pub use request::{MultipartPayload, RequestBody, RequestConfig};
