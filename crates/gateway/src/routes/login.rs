//! Login landing page.
//!
//! The gateway only lands merchants here; authentication itself is handled
//! by the dashboard application. After a completed installation the
//! redirect carries `?installed=<shop>` and the page shows the success
//! notice.

use askama::Template;
use axum::{
    Router,
    extract::Query,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    notice: Option<String>,
}

/// Build the login router.
pub fn router() -> Router<AppState> {
    Router::new().route("/login", get(login_page))
}

#[derive(Debug, Deserialize)]
struct LoginQueryParams {
    installed: Option<String>,
}

/// GET /login - Login landing page.
#[instrument(skip(params))]
async fn login_page(Query(params): Query<LoginQueryParams>) -> Response {
    let notice = params.installed.as_deref().map(installed_notice);

    let template = LoginTemplate { notice };
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// Success notice shown after a completed installation.
fn installed_notice(shop: &str) -> String {
    format!(
        "Installation for your store {shop} has completed and the credentials \
         have been sent to the store's email address. Please log in."
    )
}
