//! Page store.
//!
//! The only component that writes documents. Wraps a [`StorageBackend`] and
//! speaks in [`PageId`]s and [`Document`]s; every key it hands to the backend
//! has already passed identifier validation.

use std::sync::Arc;

use quire_storage::StorageBackend;

use crate::error::PageError;
use crate::route::PageId;

/// A named page with a raw byte body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: PageId,
    pub body: Vec<u8>,
}

impl Document {
    #[must_use]
    pub fn new(title: PageId, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// The body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Loads and saves documents on a storage backend.
#[derive(Clone)]
pub struct PageStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore").finish_non_exhaustive()
    }
}

impl PageStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Whether a document is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn exists(&self, id: &PageId) -> Result<bool, PageError> {
        Ok(self.backend.exists(id.as_str()).await?)
    }

    /// Load the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotFound`] if nothing is stored under `id`, or
    /// [`PageError::Storage`] if the backend fails.
    pub async fn load(&self, id: &PageId) -> Result<Document, PageError> {
        let body = self
            .backend
            .get(id.as_str())
            .await?
            .ok_or_else(|| PageError::NotFound { id: id.to_string() })?;
        Ok(Document {
            title: id.clone(),
            body,
        })
    }

    /// Persist `doc`, replacing whatever was stored under its title.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn save(&self, doc: &Document) -> Result<(), PageError> {
        self.backend.put(doc.title.as_str(), &doc.body).await?;
        tracing::info!(page = %doc.title, bytes = doc.body.len(), "page saved");
        Ok(())
    }

    /// Identifiers of all stored documents, sorted.
    ///
    /// Backend keys that are not valid identifiers (files placed in the
    /// storage root by hand, say) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Storage`] if the backend fails.
    pub async fn list(&self) -> Result<Vec<PageId>, PageError> {
        let keys = self.backend.list("").await?;
        Ok(keys
            .iter()
            .filter_map(|key| PageId::parse(key).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_storage::{FileBackend, MemoryBackend};

    fn id(raw: &str) -> PageId {
        PageId::parse(raw).unwrap()
    }

    fn memory_store() -> (PageStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (PageStore::new(Arc::new(backend.clone())), backend)
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let (store, _) = memory_store();
        let result = store.load(&id("Nothing")).await;
        assert!(matches!(result, Err(PageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn save_then_load_roundtrips_bytes_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(Arc::new(FileBackend::new(dir.path().join("data"), "html")));
        let body: Vec<u8> = (0u8..=255).collect();
        let doc = Document::new(id("Binary"), body.clone());

        assert!(!store.exists(&doc.title).await.unwrap());
        store.save(&doc).await.unwrap();
        assert!(store.exists(&doc.title).await.unwrap());

        let loaded = store.load(&doc.title).await.unwrap();
        assert_eq!(loaded.body, body);
        assert_eq!(loaded.title, doc.title);
    }

    #[tokio::test]
    async fn save_overwrites_rather_than_appends() {
        let (store, _) = memory_store();
        store.save(&Document::new(id("Page"), "first")).await.unwrap();
        store.save(&Document::new(id("Page"), "second")).await.unwrap();
        assert_eq!(store.load(&id("Page")).await.unwrap().body, b"second");
    }

    #[tokio::test]
    async fn list_skips_invalid_keys() {
        let (store, backend) = memory_store();
        store.save(&Document::new(id("Beta"), "b")).await.unwrap();
        store.save(&Document::new(id("Alpha"), "a")).await.unwrap();
        backend.put("not-a-page", b"x").await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec![id("Alpha"), id("Beta")]);
    }

    #[test]
    fn body_text_is_lossy() {
        let doc = Document::new(id("Page"), vec![b'o', b'k', 0xff]);
        assert_eq!(doc.body_text(), "ok\u{fffd}");
    }
}
