//! Storage backend abstraction for Quire.
//!
//! This crate defines the [`StorageBackend`] trait, a pure key-value storage
//! interface that knows nothing about pages, titles, or lifecycle rules. The
//! page store in `quire-core` wraps a storage backend and is the only writer
//! of page data.
//!
//! Two implementations are provided:
//!
//! - [`FileBackend`]: production default, one file per key under a root directory
//! - [`MemoryBackend`]: in-memory, for testing only

mod error;
mod file_backend;
mod key;
mod memory;

pub use error::StorageError;
pub use file_backend::FileBackend;
pub use memory::MemoryBackend;

/// A pluggable key-value storage backend.
///
/// Keys are flat UTF-8 strings (page identifiers). Values are opaque byte
/// arrays stored exactly as given.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, overwriting any existing value.
    ///
    /// The new value replaces the old one wholesale. Readers observe either
    /// the old value or the new one, never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
