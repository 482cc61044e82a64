//! Session gate middleware.
//!
//! Checks only that the `quire_session` cookie is present; there is no
//! server-side session table. Requests without it are redirected to the
//! login form.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::state::AppState;

/// Name of the cookie set on successful login.
pub const SESSION_COOKIE: &str = "quire_session";

/// Whether the request carries a non-empty session cookie.
#[must_use]
pub fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == SESSION_COOKIE && !value.is_empty())
}

/// `Set-Cookie` value for a fresh session.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Redirect unauthenticated requests for gated paths to `/login/admin`.
///
/// `/admin` is always gated; page saves are gated when the server runs with
/// `require_login`.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    let gated = path == "/admin"
        || (state.require_login && req.method() == Method::POST && path.starts_with("/save/"));

    if gated && !has_session(req.headers()) {
        tracing::debug!(path, "no session cookie, redirecting to login");
        return Redirect::to("/login/admin").into_response();
    }

    next.run(req).await
}
