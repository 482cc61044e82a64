//! In-memory page storage for tests and throwaway runs.
//!
//! Keys follow the same rules as [`FileBackend`](crate::FileBackend), so a
//! server started with memory storage rejects exactly the keys that disk
//! storage would. Nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::key::check_key;
use crate::{StorageBackend, StorageError};

/// Pages held in a sorted map. Clones share the same map.
///
/// # Examples
///
/// ```
/// # use quire_storage::{MemoryBackend, StorageBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let pages = MemoryBackend::new();
/// pages.put("FrontPage", b"<p>hello</p>").await.unwrap();
/// assert!(pages.exists("FrontPage").await.unwrap());
/// assert!(pages.put("../FrontPage", b"x").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    pages: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        check_key(key)?;
        Ok(self.pages.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        check_key(key)?;
        // The whole body is swapped under the write lock, so readers never
        // see part of a page.
        self.pages
            .write()
            .await
            .insert(key.to_owned(), value.to_vec());
        tracing::debug!(key, bytes = value.len(), "page held in memory");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let pages = self.pages.read().await;
        Ok(pages
            .keys()
            .skip_while(|key| key.as_str() < prefix)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        check_key(key)?;
        Ok(self.pages.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_page_reads_as_none() {
        let pages = MemoryBackend::new();
        assert_eq!(pages.get("Home").await.unwrap(), None);
        assert!(!pages.exists("Home").await.unwrap());
    }

    #[tokio::test]
    async fn body_is_kept_byte_for_byte() {
        let pages = MemoryBackend::new();
        let body = b"<h1>caf\xc3\xa9</h1>\r\n\x00\xff";
        pages.put("Home", body).await.unwrap();
        assert_eq!(pages.get("Home").await.unwrap(), Some(body.to_vec()));
    }

    #[tokio::test]
    async fn shorter_body_replaces_longer_one() {
        let pages = MemoryBackend::new();
        pages.put("Home", b"a long first draft").await.unwrap();
        pages.put("Home", b"v2").await.unwrap();
        assert_eq!(pages.get("Home").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn listing_is_sorted_and_prefix_filtered() {
        let pages = MemoryBackend::new();
        for key in ["Zeta", "Recipes2", "Alpha", "Recipes1"] {
            pages.put(key, b"x").await.unwrap();
        }
        assert_eq!(
            pages.list("").await.unwrap(),
            vec!["Alpha", "Recipes1", "Recipes2", "Zeta"]
        );
        assert_eq!(pages.list("Recipes").await.unwrap(), vec!["Recipes1", "Recipes2"]);
        assert!(pages.list("Nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_the_keys_disk_storage_rejects() {
        let pages = MemoryBackend::new();
        for key in ["", "../escape", "a/b", "a\\b", ".hidden", "nul\0byte"] {
            assert!(
                matches!(pages.put(key, b"x").await, Err(StorageError::InvalidKey { .. })),
                "put {key:?}"
            );
            assert!(
                matches!(pages.exists(key).await, Err(StorageError::InvalidKey { .. })),
                "exists {key:?}"
            );
        }
        assert!(pages.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_see_each_others_pages() {
        let pages = MemoryBackend::new();
        let handle = pages.clone();
        pages.put("Shared", b"one").await.unwrap();
        assert!(handle.exists("Shared").await.unwrap());
    }
}
