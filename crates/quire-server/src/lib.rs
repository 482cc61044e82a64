//! Quire HTTP server.
//!
//! Wires together the core library, storage backend, credential store and
//! HTML templates into a running Axum server. Page requests of the form
//! `/<operation>/<identifier>` are decoded by the core path router; anything
//! it rejects answers 404.

pub mod config;
#[cfg(feature = "postgres")]
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;
