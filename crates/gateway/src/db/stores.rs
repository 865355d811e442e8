//! Store repository for database operations.
//!
//! A store row is the installation record for one merchant shop: it exists
//! iff the OAuth flow completed at least once, and it is upserted (keyed by
//! shop domain) on every successful completion.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::PgPool;

use shopkeeper_core::{Email, ShopDomain, StoreId};

use super::RepositoryError;
use crate::models::store::Store;

const STORE_COLUMNS: &str = "id, shopify_shop_id, myshopify_domain, access_token, \
     email, name, phone, address1, address2, zip, created_at, updated_at";

// =============================================================================
// Internal Row Type
// =============================================================================

/// Internal row type for `PostgreSQL` store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    shopify_shop_id: i64,
    myshopify_domain: String,
    access_token: String,
    email: String,
    name: String,
    phone: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    zip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let domain = ShopDomain::parse(&row.myshopify_domain).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shop domain in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            shopify_shop_id: row.shopify_shop_id,
            domain,
            access_token: SecretString::from(row.access_token),
            email,
            name: row.name,
            phone: row.phone,
            address1: row.address1,
            address2: row.address2,
            zip: row.zip,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Parameters for upserting a store after a completed OAuth exchange.
#[derive(Debug)]
pub struct UpsertStore<'a> {
    /// Platform-assigned numeric shop id.
    pub shopify_shop_id: i64,
    /// Shop domain (upsert key).
    pub domain: &'a ShopDomain,
    /// Access token obtained from the token exchange.
    pub access_token: &'a str,
    /// Shop contact email.
    pub email: &'a str,
    /// Shop display name.
    pub name: &'a str,
    /// Shop phone number.
    pub phone: Option<&'a str>,
    /// Address line 1.
    pub address1: Option<&'a str>,
    /// Address line 2.
    pub address2: Option<&'a str>,
    /// Postal code.
    pub zip: Option<&'a str>,
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store by its shop domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_domain(
        &self,
        domain: &ShopDomain,
    ) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM gateway.store WHERE myshopify_domain = $1"
        ))
        .bind(domain.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a store by its internal id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM gateway.store WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create or update the store for a shop domain.
    ///
    /// Re-running the installation for the same domain updates the existing
    /// row in place; the internal id is stable across re-installations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the returned data is invalid.
    pub async fn upsert(&self, params: &UpsertStore<'_>) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO gateway.store \
                 (shopify_shop_id, myshopify_domain, access_token, email, name, \
                  phone, address1, address2, zip) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (myshopify_domain) DO UPDATE SET \
                 shopify_shop_id = EXCLUDED.shopify_shop_id, \
                 access_token = EXCLUDED.access_token, \
                 email = EXCLUDED.email, \
                 name = EXCLUDED.name, \
                 phone = EXCLUDED.phone, \
                 address1 = EXCLUDED.address1, \
                 address2 = EXCLUDED.address2, \
                 zip = EXCLUDED.zip, \
                 updated_at = now() \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(params.shopify_shop_id)
        .bind(params.domain.as_str())
        .bind(params.access_token)
        .bind(params.email)
        .bind(params.name)
        .bind(params.phone)
        .bind(params.address1)
        .bind(params.address2)
        .bind(params.zip)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }
}
