//! Shared application state for the Quire server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. Nothing in it is reconfigured after startup.

use std::sync::Arc;

use quire_core::credential::CredentialVerifier;
use quire_core::lifecycle::LifecycleController;

use crate::templates::Templates;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Create/edit rules in front of the page store.
    pub pages: Arc<LifecycleController>,
    /// Login and signup checks.
    pub credentials: CredentialVerifier,
    /// Read-only template set.
    pub templates: Templates,
    /// Whether saving a page requires the session cookie.
    pub require_login: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("require_login", &self.require_login)
            .finish_non_exhaustive()
    }
}
