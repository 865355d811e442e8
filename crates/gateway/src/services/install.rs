//! The installation flow orchestrator.
//!
//! Three scenarios can happen:
//! - New installation: no store row exists, redirect to the consent screen.
//! - Re-installation: a store row exists but its token is dead, redirect to
//!   the consent screen again.
//! - Opening the app: the stored token is still live, send the merchant to
//!   the login page.
//!
//! Every step returns an explicit [`InstallError`] kind; the route handlers
//! decide the response shape per kind.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use tracing::instrument;

use shopkeeper_core::ShopDomain;

use crate::db::{
    RepositoryError, StoreRepository, UserRepository, stores::UpsertStore, users::CreateUser,
};
use crate::error::InstallError;
use crate::models::Store;
use crate::services::password;
use crate::shopify::{self, ShopProfile};
use crate::state::AppState;

/// Where the flow sends the merchant's browser next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRedirect {
    /// To the platform's OAuth consent screen.
    Authorize(String),
    /// To the app's login page.
    Login(String),
}

impl InstallRedirect {
    /// The redirect target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Authorize(url) | Self::Login(url) => url,
        }
    }
}

/// Installation flow service.
///
/// Borrows the shared state for the duration of one request.
pub struct InstallService<'a> {
    state: &'a AppState,
}

impl<'a> InstallService<'a> {
    /// Create an installation service over the shared state.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Handle the installation entry point.
    ///
    /// Validates the request, then decides between the consent screen (new
    /// install or dead token) and the login page (token still live).
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest`, `MissingParameter`, or `PersistenceFailed`
    /// (store lookup).
    #[instrument(skip(self, params))]
    pub async fn begin(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<InstallRedirect, InstallError> {
        self.verify_signature(params)?;
        let shop = required_shop(params)?;

        let existing = StoreRepository::new(self.state.pool())
            .get_by_domain(&shop)
            .await?;

        match existing {
            Some(store) => self.resume(&shop, &store).await,
            None => {
                tracing::info!(%shop, "New installation, redirecting to consent screen");
                Ok(InstallRedirect::Authorize(self.authorization_url(&shop)))
            }
        }
    }

    /// Handle the OAuth callback.
    ///
    /// Exchanges the code, fetches the shop profile, persists store and
    /// login, and dispatches the webhook-configuration job.
    ///
    /// # Errors
    ///
    /// Returns any of the flow error kinds; see [`InstallError`].
    #[instrument(skip(self, params))]
    pub async fn complete(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<InstallRedirect, InstallError> {
        self.verify_signature(params)?;
        let shop = required_shop(params)?;
        let code = params
            .get("code")
            .filter(|code| !code.is_empty())
            .ok_or(InstallError::MissingParameter("code"))?;

        let token = self
            .state
            .shopify()
            .exchange_code(&shop, code)
            .await
            .map_err(InstallError::TokenExchangeFailed)?;

        let profile = self
            .state
            .shopify()
            .fetch_shop(&shop, &token.access_token)
            .await
            .map_err(InstallError::ProfileFetchFailed)?;

        let (store, generated_password) =
            self.persist(&shop, &token.access_token, &profile).await?;

        tracing::info!(
            shop = %store.domain,
            store_id = %store.id,
            "Installation complete"
        );

        // Fire-and-forget: the response never waits on webhook configuration.
        match self.state.jobs().enqueue(store.id) {
            Ok(job_id) => {
                tracing::info!(store_id = %store.id, %job_id, "Enqueued webhook configuration");
            }
            Err(e) => {
                tracing::error!(store_id = %store.id, error = %e, "Failed to enqueue webhook configuration");
            }
        }

        if let (Some(email), Some(generated)) = (self.state.email(), generated_password) {
            if let Err(e) = email
                .send_install_complete(
                    store.email.as_str(),
                    &store.name,
                    &generated,
                    &self.state.config().login_url(),
                )
                .await
            {
                tracing::error!(store_id = %store.id, error = %e, "Failed to send credentials email");
            }
        }

        Ok(InstallRedirect::Login(format!(
            "{}?installed={}",
            self.state.config().login_url(),
            urlencoding::encode(store.domain.as_str())
        )))
    }

    /// Decide what to do with an already-installed store: probe the stored
    /// token and either resume the session or re-run consent.
    async fn resume(
        &self,
        shop: &ShopDomain,
        store: &Store,
    ) -> Result<InstallRedirect, InstallError> {
        let token_valid = self
            .state
            .shopify()
            .probe_token(shop, store.access_token.expose_secret())
            .await;

        if token_valid {
            tracing::info!(%shop, "Stored token is live, resuming session");
            Ok(InstallRedirect::Login(self.state.config().login_url()))
        } else {
            tracing::info!(%shop, "Stored token is dead, re-authorizing");
            Ok(InstallRedirect::Authorize(self.authorization_url(shop)))
        }
    }

    /// Upsert the store and create its login if it has none yet.
    ///
    /// Returns the stored record and, when a login was created, the
    /// generated plaintext password (for the credentials email).
    /// Re-installation never regenerates an existing login.
    async fn persist(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        profile: &ShopProfile,
    ) -> Result<(Store, Option<String>), InstallError> {
        // The profile's canonical domain is the upsert key; fall back to the
        // request's shop param if the platform sends something unusable.
        let domain = ShopDomain::parse(&profile.myshopify_domain).unwrap_or_else(|e| {
            tracing::warn!(%shop, error = %e, "Profile carried a malformed domain");
            shop.clone()
        });

        let stores = StoreRepository::new(self.state.pool());
        let store = stores
            .upsert(&UpsertStore {
                shopify_shop_id: profile.id,
                domain: &domain,
                access_token,
                email: &profile.email,
                name: &profile.name,
                phone: profile.phone.as_deref(),
                address1: profile.address1.as_deref(),
                address2: profile.address2.as_deref(),
                zip: profile.zip.as_deref(),
            })
            .await?;

        let users = UserRepository::new(self.state.pool());
        if users.exists_for_store(store.id).await? {
            return Ok((store, None));
        }

        let generated = password::generate();
        let password_hash = password::hash(&generated).map_err(|_| {
            InstallError::PersistenceFailed(RepositoryError::DataCorruption(
                "failed to hash generated password".to_string(),
            ))
        })?;

        let created = users
            .create(&CreateUser {
                email: &profile.email,
                password_hash: &password_hash,
                name: &profile.name,
                store_id: store.id,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(store_id = %store.id, user_id = %user.id, "Created store login");
                Ok((store, Some(generated)))
            }
            // Lost a race with a concurrent callback; the login exists.
            Err(RepositoryError::Conflict(_)) => Ok((store, None)),
            Err(e) => Err(e.into()),
        }
    }

    fn authorization_url(&self, shop: &ShopDomain) -> String {
        self.state
            .shopify()
            .authorization_url(shop, &self.state.config().redirect_uri())
    }

    fn verify_signature(&self, params: &HashMap<String, String>) -> Result<(), InstallError> {
        let secret = self.state.config().shopify.api_secret.expose_secret();
        if shopify::verify_request(params, secret) {
            Ok(())
        } else {
            Err(InstallError::InvalidRequest("signature verification failed"))
        }
    }
}

/// Extract and validate the `shop` query parameter.
fn required_shop(params: &HashMap<String, String>) -> Result<ShopDomain, InstallError> {
    let raw = params
        .get("shop")
        .filter(|shop| !shop.is_empty())
        .ok_or(InstallError::MissingParameter("shop"))?;

    ShopDomain::parse(raw).map_err(|e| {
        tracing::warn!(shop = %raw, error = %e, "Rejecting malformed shop parameter");
        InstallError::InvalidRequest("shop is not a valid shop domain")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_required_shop_present() {
        let shop = required_shop(&params(&[("shop", "example.myshopify.com")])).unwrap();
        assert_eq!(shop.as_str(), "example.myshopify.com");
    }

    #[test]
    fn test_required_shop_missing() {
        assert!(matches!(
            required_shop(&params(&[("code", "abc")])),
            Err(InstallError::MissingParameter("shop"))
        ));
    }

    #[test]
    fn test_required_shop_empty() {
        assert!(matches!(
            required_shop(&params(&[("shop", "")])),
            Err(InstallError::MissingParameter("shop"))
        ));
    }

    #[test]
    fn test_required_shop_rejects_injection() {
        assert!(matches!(
            required_shop(&params(&[("shop", "evil.example/admin?x=")])),
            Err(InstallError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_install_redirect_url() {
        let redirect = InstallRedirect::Authorize("https://a.example/consent".to_string());
        assert_eq!(redirect.url(), "https://a.example/consent");

        let redirect = InstallRedirect::Login("https://app.example/login".to_string());
        assert_eq!(redirect.url(), "https://app.example/login");
    }
}
