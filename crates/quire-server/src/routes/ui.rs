//! Landing page, admin dashboard, page index and static error pages.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use quire_core::route::PageId;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{PageView, TemplateName};

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/admin", get(admin_dashboard))
        .route("/files", get(list_files))
        .route("/error/{name}", get(error_page))
}

// ── Landing and page index ───────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<PageId>,
}

async fn landing_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let pages = state.pages.list().await?;
    Ok(state.templates.render(
        TemplateName::Landing,
        &PageView {
            pages: &pages,
            ..PageView::default()
        },
    ))
}

/// JSON index of stored page identifiers.
async fn list_files(State(state): State<Arc<AppState>>) -> Result<Json<FileList>, AppError> {
    let files = state.pages.list().await?;
    Ok(Json(FileList { files }))
}

// ── Admin ────────────────────────────────────────────────────────────

/// Admin dashboard. Only reachable with a session cookie (see `session_gate`).
async fn admin_dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let pages = state.pages.list().await?;
    let summary = format!("{} stored page(s)", pages.len());
    Ok(state.templates.render(
        TemplateName::Admin,
        &PageView {
            title: "admin",
            body: &summary,
            pages: &pages,
            ..PageView::default()
        },
    ))
}

// ── Error pages ──────────────────────────────────────────────────────

/// Static pages the save handler redirects to when a submission is rejected.
async fn error_page(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let template = [TemplateName::CreateError, TemplateName::EditError]
        .into_iter()
        .find(|t| t.file_name() == name)
        .ok_or_else(|| AppError::NotFound(format!("no error page named '{name}'")))?;
    Ok(state.templates.render(template, &PageView::default()))
}
