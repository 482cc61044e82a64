//! Filesystem storage backend, the production default.
//!
//! Each key is stored as one file named `<key>.<extension>` directly under a
//! root directory. The root is created on first write. Writes go to a hidden
//! temp file in the same directory which is then renamed over the target, so
//! a concurrent reader sees either the previous content or the new content.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::key::check_key;
use crate::{StorageBackend, StorageError};

/// A storage backend that keeps one file per key under a root directory.
///
/// # Examples
///
/// ```no_run
/// # use quire_storage::FileBackend;
/// let backend = FileBackend::new("./data", "html");
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
    extension: String,
}

impl FileBackend {
    /// Create a backend rooted at `root`, storing files with the given
    /// extension (without the leading dot).
    ///
    /// Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(root: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.into().trim_start_matches('.').to_owned(),
        }
    }

    /// Return the storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto its file path, refusing anything that could escape the root.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(format!("{key}.{}", self.extension)))
    }

    /// Strip the configured extension from a directory entry name.
    fn key_from_file_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        if name.starts_with('.') {
            return None;
        }
        name.strip_suffix(self.extension.as_str())
            .and_then(|stem| stem.strip_suffix('.'))
            .filter(|stem| !stem.is_empty())
    }

    async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Open {
                path: self.root.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        self.ensure_root().await?;

        let tmp_path = self
            .root
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().as_simple()));
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        };

        let staged = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(value).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = staged {
            // Leave nothing half-written behind.
            let _ = tokio::fs::remove_file(&tmp_path).await;
            tracing::warn!(key, error = %e, "staged page write failed");
            return Err(write_err(e));
        }

        tracing::debug!(key, bytes = value.len(), "page file written");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let list_err = |e: std::io::Error| StorageError::List {
            prefix: prefix.to_owned(),
            reason: e.to_string(),
        };

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_err(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            if !entry.file_type().await.map_err(list_err)?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match self.key_from_file_name(name) {
                Some(key) if key.starts_with(prefix) => keys.push(key.to_owned()),
                _ => {}
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Read {
                key: key.to_owned(),
                reason: e.to_string(),
            }),
        }
    }
}
