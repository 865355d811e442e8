//! Unified error handling for the installation flow.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// JSON body for non-redirect installation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Whether the request succeeded.
    pub status: bool,
    /// Human-readable outcome description.
    pub message: String,
}

/// Errors produced by the installation flow.
///
/// Every branch of the flow returns one of these; the handlers decide the
/// response shape per kind (the entry point may be configured to answer
/// silently, the OAuth callback always answers with JSON).
#[derive(Debug, Error)]
pub enum InstallError {
    /// The request failed authenticity or shape validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    /// A required query parameter is absent.
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The authorization code could not be exchanged for an access token.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(#[source] ShopifyError),

    /// The shop profile could not be fetched with the new token.
    #[error("Shop profile fetch failed: {0}")]
    ProfileFetchFailed(#[source] ShopifyError),

    /// Store or user records could not be persisted.
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] RepositoryError),
}

impl InstallError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNAUTHORIZED,
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::TokenExchangeFailed(_) | Self::ProfileFetchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for InstallError {
    fn into_response(self) -> Response {
        // Report server-side failures; client mistakes are just request noise
        if matches!(
            self,
            Self::TokenExchangeFailed(_) | Self::ProfileFetchFailed(_) | Self::PersistenceFailed(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Installation request error"
            );
        }

        let status = self.status_code();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::TokenExchangeFailed(_) | Self::ProfileFetchFailed(_) => {
                "Upstream platform error during installation".to_string()
            }
            Self::PersistenceFailed(_) => {
                "Problem during installation. Please check logs.".to_string()
            }
            _ => self.to_string(),
        };

        (
            status,
            Json(ApiMessage {
                status: false,
                message,
            }),
        )
            .into_response()
    }
}
