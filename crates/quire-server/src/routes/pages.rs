//! Page routes: `/{view,edit,create,save}/{id}`.
//!
//! `view`, `edit` and `create` render forms from the current page state
//! (an absent page renders as an empty shell). `save` hands the submitted
//! title and body to the lifecycle controller and redirects to the written
//! page, or to a static error page when the create/edit rules reject it.

use std::sync::Arc;

use axum::Form;
use axum::extract::{FromRequest, Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use quire_core::error::LifecycleError;
use quire_core::lifecycle::Intent;
use quire_core::route::{Operation, PageId, RouteMatch};

use crate::error::AppError;
use crate::routes::{auth, found};
use crate::state::AppState;
use crate::templates::{PageView, TemplateName};

/// Redirect target when a create hits an existing page.
pub const CREATE_ERROR_LOCATION: &str = "/error/create_error.html";
/// Redirect target when an edit hits a missing page.
pub const EDIT_ERROR_LOCATION: &str = "/error/edit_error.html";

/// Fields posted by the create and edit forms.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub newpage_name: String,
    #[serde(default)]
    pub newpage_body: String,
    /// `create` or `edit`. Falls back to the path identifier when missing.
    #[serde(default)]
    pub intent: Option<String>,
}

/// Decode the request path with the core router and hand off by operation.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, AppError> {
    let route = RouteMatch::parse(req.uri().path())?;
    let method = req.method().clone();

    if method == Method::GET || method == Method::HEAD {
        show(&state, &route).await
    } else if method == Method::POST {
        match route.operation {
            Operation::Save => save(&state, &route.id, req).await,
            Operation::Login => auth::login(&state, req).await,
            Operation::Signup => auth::signup(&state, &route.id, req).await,
            Operation::View | Operation::Edit | Operation::Create => show(&state, &route).await,
        }
    } else {
        Err(AppError::MethodNotAllowed(format!(
            "{method} is not supported on /{}/{}",
            route.operation, route.id
        )))
    }
}

// ── Forms and pages ──────────────────────────────────────────────────

/// Render the page or form for a matched route.
async fn show(state: &AppState, route: &RouteMatch) -> Result<Response, AppError> {
    let id = route.id.as_str();
    let template = match route.operation {
        Operation::View => TemplateName::View,
        Operation::Edit => TemplateName::Edit,
        Operation::Create => TemplateName::Create,
        Operation::Login => TemplateName::Login,
        Operation::Signup => TemplateName::Signup,
        Operation::Save => {
            return Err(AppError::MethodNotAllowed(
                "pages are saved with POST".to_owned(),
            ));
        }
    };

    let doc = match route.operation {
        Operation::View | Operation::Edit => state.pages.view(&route.id).await?,
        _ => None,
    };
    let body = doc.as_ref().map(|d| d.body_text()).unwrap_or_default();

    // `/create/{id}` is only a link target; the title box starts empty.
    let title = if route.operation == Operation::Create { "" } else { id };
    let html = state.templates.render(
        template,
        &PageView {
            id,
            title,
            body: &body,
            pages: &[],
        },
    );
    Ok(html.into_response())
}

// ── Submissions ──────────────────────────────────────────────────────

/// Apply a create or edit submission.
async fn save(state: &AppState, path_id: &PageId, req: Request) -> Result<Response, AppError> {
    let Form(form) = Form::<SaveForm>::from_request(req, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    let intent: Intent = form
        .intent
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(path_id.as_str())
        .parse()?;

    match state
        .pages
        .submit(intent, &form.newpage_name, form.newpage_body)
        .await
    {
        Ok(id) => Ok(found(&format!("/view/{id}"))),
        Err(LifecycleError::AlreadyExists { .. }) => Ok(found(CREATE_ERROR_LOCATION)),
        Err(LifecycleError::Missing { .. }) => Ok(found(EDIT_ERROR_LOCATION)),
        Err(e) => Err(e.into()),
    }
}
