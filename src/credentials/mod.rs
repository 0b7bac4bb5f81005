//! Credential persistence.
//!
//! [`CredentialStore`] is the async key-value seam the API client reads and
//! writes tokens through. [`MemoryStore`] keeps them for the lifetime of the
//! process; [`FileStore`] persists them as a JSON object on disk.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Key under which the short-lived access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Key under which the refresh token is stored.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Async string store holding at most one value per key.
///
/// Implementations must tolerate concurrent calls; the client performs no
/// locking of its own around individual reads and writes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removes `key`. Deleting a missing key is not an error.
    async fn delete_item(&self, key: &str) -> Result<(), StoreError>;
}
