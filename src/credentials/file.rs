use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{CredentialStore, StoreError};

/// Persists credentials as a flat JSON object:
///
/// ```json
/// {
///   "accessToken": "eyJhbGciOi...",
///   "refreshToken": "eyJhbGciOi..."
/// }
/// ```
///
/// A missing file reads as an empty store. Writes go to a sibling temp file
/// that is then renamed over the original; on Unix the file is created with
/// mode `0600`.
pub struct FileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let content = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, content).await.map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(io_err)?;
        }
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        debug!(path = %self.path.display(), keys = entries.len(), "Credential file written");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn delete_item(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));

        assert_eq!(store.get_item(ACCESS_TOKEN_KEY).await.unwrap(), None);
        store.delete_item(ACCESS_TOKEN_KEY).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        store.set_item(ACCESS_TOKEN_KEY, "access").await.unwrap();
        store.set_item(REFRESH_TOKEN_KEY, "refresh").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get_item(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
            Some("access")
        );
        assert_eq!(
            reopened.get_item(REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("refresh")
        );

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "access");
    }

    #[tokio::test]
    async fn test_delete_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));
        store.set_item(ACCESS_TOKEN_KEY, "access").await.unwrap();
        store.set_item(REFRESH_TOKEN_KEY, "refresh").await.unwrap();

        store.delete_item(ACCESS_TOKEN_KEY).await.unwrap();

        assert_eq!(store.get_item(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(
            store.get_item(REFRESH_TOKEN_KEY).await.unwrap().as_deref(),
            Some("refresh")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        let err = store.get_item(ACCESS_TOKEN_KEY).await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private_on_unix() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileStore::new(&path);
        store.set_item(ACCESS_TOKEN_KEY, "access").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
