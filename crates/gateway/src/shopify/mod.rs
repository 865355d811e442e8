//! Shopify platform API client and request verification.
//!
//! Two concerns live here:
//! - [`Client`] - outbound calls for the OAuth handshake (authorization URL,
//!   code-for-token exchange, shop profile fetch, token-liveness probe)
//! - [`verify_request`] - HMAC-SHA256 verification that an inbound request
//!   was signed by the platform with this app's API secret

pub mod client;
pub mod hmac;

pub use client::{Client, OAuthToken, ShopProfile};
pub use hmac::verify_request;

use thiserror::Error;

/// Errors that can occur when calling the Shopify platform API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, timeout, or body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with an unexpected status code.
    #[error("unexpected status {0} from platform")]
    UnexpectedStatus(u16),

    /// The token exchange response carried no usable access token.
    #[error("token response did not contain an access token")]
    MissingAccessToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::UnexpectedStatus(503);
        assert_eq!(err.to_string(), "unexpected status 503 from platform");

        let err = ShopifyError::MissingAccessToken;
        assert_eq!(
            err.to_string(),
            "token response did not contain an access token"
        );
    }
}
