//! Server configuration for Quire.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `QUIRE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Where page documents live.
    pub storage: StorageKind,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Directory with `<template>.html` files overriding the built-in templates.
    pub template_dir: Option<PathBuf>,
    /// Directory served as-is under `/static`.
    pub static_dir: Option<PathBuf>,
    /// Insert stored page bodies into the view template without escaping.
    pub raw_html: bool,
    /// Require the session cookie for page saves, not just for `/admin`.
    pub require_login: bool,
    /// PostgreSQL URL for the credential store. `None` keeps credentials in memory.
    pub database_url: Option<String>,
    /// Upper bound on requests handled at once.
    pub max_concurrent_requests: usize,
}

/// Supported page storage types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// One file per page under `root`, named `<id>.<extension>`.
    File { root: PathBuf, extension: String },
}

const DEFAULT_PORT: u16 = 8080;

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on all interfaces
    /// - `QUIRE_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8080`)
    /// - `QUIRE_STORAGE`: `file` or `memory` (default: `file`)
    /// - `QUIRE_DATA_DIR`: storage root for the file backend (default: `data`)
    /// - `QUIRE_PAGE_EXTENSION`: page file extension (default: `html`)
    /// - `QUIRE_LOG_LEVEL`: log filter (default: `info`)
    /// - `QUIRE_TEMPLATE_DIR`: template override directory (optional)
    /// - `QUIRE_STATIC_DIR`: directory served under `/static` (optional)
    /// - `QUIRE_RAW_HTML`: render page bodies as HTML fragments (default: `false`)
    /// - `QUIRE_REQUIRE_LOGIN`: gate saves behind the session cookie (default: `false`)
    /// - `QUIRE_MAX_CONCURRENCY`: concurrent request limit (default: `256`)
    /// - `DATABASE_URL`: PostgreSQL credential store (optional)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false)
        };
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        // Priority: QUIRE_BIND_ADDR > PORT > default 127.0.0.1:8080
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));
        let bind_addr = if let Some(addr) = lookup("QUIRE_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = lookup("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            default_addr
        };

        let storage = match lookup("QUIRE_STORAGE")
            .unwrap_or_else(|| "file".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageKind::Memory,
            _ => StorageKind::File {
                root: path("QUIRE_DATA_DIR").unwrap_or_else(|| PathBuf::from("data")),
                extension: lookup("QUIRE_PAGE_EXTENSION")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "html".to_owned()),
            },
        };

        Self {
            bind_addr,
            storage,
            log_level: lookup("QUIRE_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            template_dir: path("QUIRE_TEMPLATE_DIR"),
            static_dir: path("QUIRE_STATIC_DIR"),
            raw_html: flag("QUIRE_RAW_HTML"),
            require_login: flag("QUIRE_REQUIRE_LOGIN"),
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            max_concurrent_requests: lookup("QUIRE_MAX_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(256),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(
            config.storage,
            StorageKind::File {
                root: PathBuf::from("data"),
                extension: "html".to_owned()
            }
        );
        assert_eq!(config.log_level, "info");
        assert!(!config.raw_html);
        assert!(!config.require_login);
        assert_eq!(config.database_url, None);
        assert_eq!(config.max_concurrent_requests, 256);
    }

    #[test]
    fn bind_addr_beats_port() {
        let config = config_from(&[("QUIRE_BIND_ADDR", "0.0.0.0:9000"), ("PORT", "7000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));

        let config = config_from(&[("PORT", "7000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 7000)));
    }

    #[test]
    fn storage_and_flags() {
        let config = config_from(&[
            ("QUIRE_STORAGE", "MEMORY"),
            ("QUIRE_RAW_HTML", "true"),
            ("QUIRE_REQUIRE_LOGIN", "1"),
            ("DATABASE_URL", "postgres://localhost/quire"),
            ("QUIRE_MAX_CONCURRENCY", "0"),
        ]);
        assert_eq!(config.storage, StorageKind::Memory);
        assert!(config.raw_html);
        assert!(config.require_login);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/quire")
        );
        assert_eq!(config.max_concurrent_requests, 256);
    }

    #[test]
    fn file_storage_options() {
        let config = config_from(&[
            ("QUIRE_DATA_DIR", "/srv/pages"),
            ("QUIRE_PAGE_EXTENSION", "txt"),
            ("QUIRE_TEMPLATE_DIR", "/srv/tmpl"),
            ("QUIRE_STATIC_DIR", ""),
        ]);
        assert_eq!(
            config.storage,
            StorageKind::File {
                root: PathBuf::from("/srv/pages"),
                extension: "txt".to_owned()
            }
        );
        assert_eq!(config.template_dir, Some(PathBuf::from("/srv/tmpl")));
        assert_eq!(config.static_dir, None);
    }
}
