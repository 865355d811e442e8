//! Installation flow routes.
//!
//! Both routes take the raw query-parameter map: the platform signs the
//! full parameter set, so the handlers must see every key, not a typed
//! subset.

use std::collections::HashMap;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::instrument;

use crate::config::EntryErrorMode;
use crate::services::InstallService;
use crate::state::AppState;

/// Build the installation flow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/install", get(start_installation))
        .route("/auth/redirect", get(oauth_callback))
}

/// GET /install - Installation entry point.
///
/// Redirects to the consent screen or the login page. On rejection the
/// response shape follows `INSTALL_ERROR_RESPONSE`: the platform's own
/// install link retries, so the default is to log and answer blandly.
#[instrument(skip(state, params))]
async fn start_installation(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match InstallService::new(&state).begin(&params).await {
        Ok(redirect) => Redirect::to(redirect.url()).into_response(),
        Err(e) => match state.config().entry_error_mode {
            EntryErrorMode::Silent => {
                tracing::warn!(error = %e, "Install request rejected");
                StatusCode::OK.into_response()
            }
            EntryErrorMode::Json => e.into_response(),
        },
    }
}

/// GET /auth/redirect - OAuth callback.
///
/// Completes the installation and redirects to the login page; every
/// failure answers with the structured JSON error body.
#[instrument(skip(state, params))]
async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match InstallService::new(&state).complete(&params).await {
        Ok(redirect) => Redirect::to(redirect.url()).into_response(),
        Err(e) => e.into_response(),
    }
}
