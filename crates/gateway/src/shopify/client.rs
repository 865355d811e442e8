//! Outbound Shopify platform API client.
//!
//! The installation flow needs exactly three call shapes: the token
//! exchange POST, the authenticated shop-profile GET, and a lightweight
//! token-liveness probe (the same GET, with only the status inspected).
//! No retries anywhere; every failure is terminal for the request that
//! triggered it.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use shopkeeper_core::ShopDomain;

use super::ShopifyError;
use crate::config::ShopifyApiConfig;

/// Outbound request timeout. The source platform leaves this unspecified;
/// a bounded wait keeps a slow platform from pinning request handlers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the access token on authenticated calls.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// OAuth token obtained from a code exchange.
#[derive(Debug, Clone)]
pub struct OAuthToken {
    /// The access token for API calls.
    pub access_token: String,
    /// Granted scopes (comma-separated, as reported by the platform).
    pub scope: String,
}

/// Shop profile returned by `GET /admin/shop.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopProfile {
    /// Platform-assigned numeric shop id.
    pub id: i64,
    /// Shop display name.
    pub name: String,
    /// Shop contact email.
    pub email: String,
    /// Canonical shop domain.
    pub myshopify_domain: String,
    /// Shop phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Address line 1.
    #[serde(default)]
    pub address1: Option<String>,
    /// Address line 2.
    #[serde(default)]
    pub address2: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub zip: Option<String>,
}

/// Envelope around the shop profile in the platform response.
#[derive(Debug, Deserialize)]
struct ShopEnvelope {
    shop: ShopProfile,
}

/// Token exchange response body.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Shopify platform API client.
///
/// Cheap to clone; the underlying HTTP client and app credentials are
/// shared behind an `Arc`.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    scopes: String,
}

impl Client {
    /// Create a new platform API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ShopifyApiConfig) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.expose_secret().to_string(),
                scopes: config.scopes.clone(),
            }),
        })
    }

    /// Generate the OAuth authorization URL for a shop.
    ///
    /// The merchant's browser is redirected here to grant consent; the
    /// platform then calls back with an authorization code.
    #[must_use]
    pub fn authorization_url(&self, shop: &ShopDomain, redirect_uri: &str) -> String {
        format!(
            "https://{}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}",
            shop,
            urlencoding::encode(&self.inner.api_key),
            urlencoding::encode(&self.inner.scopes),
            urlencoding::encode(redirect_uri)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UnexpectedStatus` on a non-2xx response,
    /// `ShopifyError::MissingAccessToken` if the response body carries no
    /// token, and `ShopifyError::Http` on transport or decode failures.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<OAuthToken, ShopifyError> {
        let url = format!("https://{shop}/admin/oauth/access_token");

        let body = serde_json::json!({
            "client_id": self.inner.api_key,
            "client_secret": self.inner.api_secret,
            "code": code,
        });

        let response = self.inner.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ShopifyError::UnexpectedStatus(response.status().as_u16()));
        }

        token_from_response(response.json().await?)
    }

    /// Fetch the shop profile with an access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UnexpectedStatus` on a non-2xx response and
    /// `ShopifyError::Http` on transport or decode failures.
    #[instrument(skip(self, access_token), fields(shop = %shop))]
    pub async fn fetch_shop(
        &self,
        shop: &ShopDomain,
        access_token: &str,
    ) -> Result<ShopProfile, ShopifyError> {
        let url = format!("https://{shop}/admin/shop.json");

        let response = self
            .inner
            .http
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShopifyError::UnexpectedStatus(response.status().as_u16()));
        }

        let envelope: ShopEnvelope = response.json().await?;
        Ok(envelope.shop)
    }

    /// Check whether a stored access token is still live.
    ///
    /// Issues the shop-profile GET and inspects only the status. Every
    /// failure mode - non-2xx, timeout, connect error - reads as "invalid";
    /// the flow then re-authorizes rather than trusting a stale credential.
    #[instrument(skip(self, access_token), fields(shop = %shop))]
    pub async fn probe_token(&self, shop: &ShopDomain, access_token: &str) -> bool {
        if access_token.is_empty() {
            return false;
        }

        let url = format!("https://{shop}/admin/shop.json");

        match self
            .inner
            .http
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, access_token)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                tracing::debug!(%error, "token probe failed in transport");
                false
            }
        }
    }
}

/// Normalize a token exchange body: a missing, null, or empty
/// `access_token` all mean the exchange failed.
fn token_from_response(response: AccessTokenResponse) -> Result<OAuthToken, ShopifyError> {
    let access_token = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(ShopifyError::MissingAccessToken)?;

    Ok(OAuthToken {
        access_token,
        scope: response.scope.unwrap_or_default(),
    })
}
