use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError};

/// Process-local store, mainly for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with an access/refresh token pair.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut entries = HashMap::new();
        if let Some(access) = access {
            entries.insert(super::ACCESS_TOKEN_KEY.to_string(), access.to_string());
        }
        if let Some(refresh) = refresh {
            entries.insert(super::REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        }
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
