//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Liveness check
//! GET  /health/ready    - Readiness check (database connectivity)
//!
//! # Installation flow
//! GET  /install         - Entry point (platform-signed, ?shop=<domain>)
//! GET  /auth/redirect   - OAuth callback (?shop=<domain>&code=<code>)
//!
//! # Merchant-facing
//! GET  /login           - Login landing page
//! ```

pub mod install;
pub mod login;

use axum::Router;

use crate::state::AppState;

/// Build the application router (health endpoints are mounted in `main`).
pub fn routes() -> Router<AppState> {
    Router::new().merge(install::router()).merge(login::router())
}
