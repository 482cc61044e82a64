//! Quire server entry point.
//!
//! Reads configuration from the environment, opens the page storage and the
//! credential store, then serves the Axum application until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use quire_core::credential::{CredentialStore, CredentialVerifier, MemoryCredentialStore};
use quire_core::lifecycle::LifecycleController;
use quire_core::page::PageStore;
use quire_storage::{FileBackend, MemoryBackend, StorageBackend};

use quire_server::config::{ServerConfig, StorageKind};
use quire_server::routes;
use quire_server::state::AppState;
use quire_server::templates::Templates;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage, "Quire starting");

    let state = build_app_state(&config).await?;
    let app = routes::app(
        state,
        config.static_dir.as_deref(),
        config.max_concurrent_requests,
    );

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Quire server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Quire server stopped");
    Ok(())
}

async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = match &config.storage {
        StorageKind::Memory => {
            warn!("using in-memory page storage (pages will not persist)");
            Arc::new(MemoryBackend::new())
        }
        StorageKind::File { root, extension } => {
            info!(root = %root.display(), extension = %extension, "using file page storage");
            Arc::new(FileBackend::new(root, extension.as_str()))
        }
    };

    let credentials = build_credential_store(config).await?;

    let templates = Templates::load(config.template_dir.as_deref(), config.raw_html)
        .context("failed to load templates")?;

    Ok(Arc::new(AppState {
        pages: Arc::new(LifecycleController::new(PageStore::new(storage))),
        credentials: CredentialVerifier::new(credentials),
        templates,
        require_login: config.require_login,
    }))
}

#[cfg(feature = "postgres")]
async fn build_credential_store(
    config: &ServerConfig,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    if let Some(url) = &config.database_url {
        info!("using PostgreSQL credential store");
        let store = quire_server::credentials::PostgresCredentialStore::connect(url)
            .await
            .context("failed to connect to PostgreSQL credential store")?;
        return Ok(Arc::new(store));
    }
    warn!("DATABASE_URL not set, user accounts are kept in memory");
    Ok(Arc::new(MemoryCredentialStore::new()))
}

#[cfg(not(feature = "postgres"))]
async fn build_credential_store(
    config: &ServerConfig,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    if config.database_url.is_some() {
        anyhow::bail!("DATABASE_URL is set but feature 'postgres' is not enabled");
    }
    warn!("user accounts are kept in memory");
    Ok(Arc::new(MemoryCredentialStore::new()))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
