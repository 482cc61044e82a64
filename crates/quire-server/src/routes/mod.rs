//! HTTP route modules for the Quire server.
//!
//! Fixed paths (`/`, `/admin`, `/files`, `/error/{name}`, `/static`) are
//! registered directly. Everything else falls through to the page
//! dispatcher, which decodes `/<operation>/<identifier>` with the core path
//! router and answers 404 for anything outside that grammar.

pub mod auth;
pub mod pages;
pub mod ui;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware as axum_mw;
use axum::response::{IntoResponse, Response};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::session_gate;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: Arc<AppState>, static_dir: Option<&Path>, max_concurrent: usize) -> Router {
    let mut app = Router::new()
        .merge(ui::router())
        .fallback(pages::dispatch);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(axum_mw::from_fn_with_state(
        Arc::clone(&state),
        session_gate,
    ))
    .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
    .layer(TraceLayer::new_for_http())
    .layer(SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    ))
    .with_state(state)
}

/// `302 Found` with a `Location` header.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
