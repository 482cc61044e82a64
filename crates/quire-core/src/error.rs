//! Error types for `quire-core`.
//!
//! Each error variant carries enough context to diagnose the problem without
//! a debugger. Credential errors never include passwords or digests, only
//! usernames or field names.

use quire_storage::StorageError;

/// Errors from the path router.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The request path does not match `/<operation>/<identifier>`.
    #[error("no route matches '{path}'")]
    NotFound { path: String },

    /// The operation segment is not one of the known operations.
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// The identifier is empty or contains characters outside `[A-Za-z0-9]`.
    #[error("invalid page identifier '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },
}

/// Errors from the page store.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No document is stored under this identifier.
    #[error("page not found: {id}")]
    NotFound { id: String },

    /// The storage backend failed.
    #[error("page storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from the page lifecycle controller.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The submitted title is empty after trimming or is not a valid identifier.
    #[error("invalid page title: {reason}")]
    InvalidTitle { reason: String },

    /// The submission did not say whether it is a create or an edit.
    #[error("unknown page intent '{name}': expected 'create' or 'edit'")]
    UnknownIntent { name: String },

    /// A create was submitted for a page that already exists.
    #[error("page already exists: {id}")]
    AlreadyExists { id: String },

    /// An edit was submitted for a page that does not exist.
    #[error("cannot edit missing page: {id}")]
    Missing { id: String },

    /// The page store failed while checking or writing.
    #[error("lifecycle storage error: {0}")]
    Page(#[from] PageError),
}

impl LifecycleError {
    /// Whether this rejection comes from the create/edit state rules rather
    /// than bad input or a storage fault.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::Missing { .. })
    }
}

/// Errors from credential verification and account registration.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A required form field was empty.
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// Password and confirmation differ.
    #[error("password confirmation does not match")]
    PasswordMismatch,

    /// Signup for a username that already has a record.
    #[error("username already taken: {username}")]
    UsernameTaken { username: String },

    /// The credential store could not be reached or returned an error.
    #[error("credential store unavailable: {reason}")]
    Unavailable { reason: String },
}
