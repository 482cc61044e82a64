//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to create or open the storage root.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to list keys with the given prefix.
    #[error("failed to list keys with prefix '{prefix}': {reason}")]
    List { prefix: String, reason: String },

    /// A key that cannot be mapped safely onto the backend.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}
