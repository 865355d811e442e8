//! Installed merchant store.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use shopkeeper_core::{Email, ShopDomain, StoreId};

/// An installed merchant store.
///
/// A row's presence with a live access token means installation is
/// complete; the token's liveness is only ever established by probing the
/// platform, never assumed.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct Store {
    /// Internal id (stable across re-installations).
    pub id: StoreId,
    /// Platform-assigned numeric shop id.
    pub shopify_shop_id: i64,
    /// Shop domain (unique key).
    pub domain: ShopDomain,
    /// OAuth access token (redacted in debug output).
    pub access_token: SecretString,
    /// Shop contact email.
    pub email: Email,
    /// Shop display name.
    pub name: String,
    /// Shop phone number.
    pub phone: Option<String>,
    /// Address line 1.
    pub address1: Option<String>,
    /// Address line 2.
    pub address2: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// When the store was first installed.
    pub created_at: DateTime<Utc>,
    /// When the installation record was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("shopify_shop_id", &self.shopify_shop_id)
            .field("domain", &self.domain)
            .field("access_token", &"[REDACTED]")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_debug_redacts_access_token() {
        let store = Store {
            id: StoreId::new(1),
            shopify_shop_id: 548_380_009,
            domain: ShopDomain::parse("example.myshopify.com").unwrap(),
            access_token: SecretString::from("shpat_very_secret_token"),
            email: Email::parse("owner@example.com").unwrap(),
            name: "Example Store".to_string(),
            phone: None,
            address1: None,
            address2: None,
            zip: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let debug_output = format!("{store:?}");

        assert!(debug_output.contains("example.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_very_secret_token"));
    }
}
