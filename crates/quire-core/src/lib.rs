//! Core library for Quire.
//!
//! Holds the decision logic of the page server: the path router that turns a
//! request path into an operation and a page identifier, the credential
//! verifier, the page store that owns persisted documents, and the lifecycle
//! controller that decides whether a create or edit may proceed. This crate
//! depends on `quire-storage` for the storage backend trait and knows nothing
//! about HTTP.

pub mod credential;
pub mod error;
pub mod lifecycle;
pub mod page;
pub mod route;
