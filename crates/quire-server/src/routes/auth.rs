//! Login and signup form handlers: `POST /login/{id}`, `POST /signup/{id}`.
//!
//! Empty fields are rejected before the credential verifier is consulted.
//! A failed login gives the same answer whether the username is unknown or
//! the password is wrong.

use axum::Form;
use axum::extract::{FromRequest, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use zeroize::Zeroizing;

use quire_core::credential::require_field;
use quire_core::route::PageId;

use crate::error::AppError;
use crate::middleware::session_cookie;
use crate::routes::found;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "passwordConfirm")]
    pub password_confirm: String,
}

/// Verify a login form and set the session cookie on success.
pub async fn login(state: &AppState, req: Request) -> Result<Response, AppError> {
    let Form(form) = Form::<LoginForm>::from_request(req, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    let username = form.username;
    let password = Zeroizing::new(form.password);

    require_field("username", &username)?;
    require_field("password", password.as_str())?;

    if !state.credentials.verify(&username, password.as_str()).await? {
        tracing::info!(%username, "login rejected");
        return Err(AppError::Unauthorized(
            "invalid username or password".to_owned(),
        ));
    }

    tracing::info!(%username, "login accepted");
    let token = uuid::Uuid::new_v4().as_simple().to_string();
    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        found("/admin"),
    )
        .into_response())
}

/// Register a new account, then send the user to the login form.
pub async fn signup(state: &AppState, id: &PageId, req: Request) -> Result<Response, AppError> {
    let Form(form) = Form::<SignupForm>::from_request(req, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    let password = Zeroizing::new(form.password);
    let confirm = Zeroizing::new(form.password_confirm);

    state
        .credentials
        .register(&form.username, password.as_str(), confirm.as_str())
        .await?;

    Ok(found(&format!("/login/{id}")))
}
