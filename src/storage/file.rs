//! File-backed key-value store
//!
//! Stores each key as `<base_dir>/<key>.json`. Writes land in a temporary
//! sibling file that is renamed over the target, so a reader never sees a
//! half-written value.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{KeyValueStore, StorageError};

/// Key-value store persisting one file per key
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_dir`. The directory is created lazily on first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Root directory of this store
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::Io(format!("invalid key: {key:?}")));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let tmp_path = self.base_dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp_path, value)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("nested"));

        assert_eq!(store.get("goals").await.unwrap(), None);

        store.set("goals", "[]").await.unwrap();
        assert_eq!(store.get("goals").await.unwrap(), Some("[]".to_string()));
        assert!(dir.path().join("nested").join("goals.json").exists());

        // A fresh handle over the same directory sees the same data
        let reopened = FileKeyValueStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get("goals").await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.remove("userDetails").await.unwrap();
        store.set("userDetails", "{}").await.unwrap();
        store.remove("userDetails").await.unwrap();
        assert_eq!(store.get("userDetails").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("a/b").await.is_err());
        assert!(store.remove("").await.is_err());
    }
}
