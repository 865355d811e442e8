//! User repository for database operations.
//!
//! Each store gets exactly one generated login, created on the first
//! successful installation. Re-installation never touches it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopkeeper_core::{Email, StoreId, UserId};

use super::RepositoryError;
use crate::models::user::User;

// =============================================================================
// Internal Row Type
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
///
/// The password hash is deliberately not selected; nothing in the flow
/// reads it back after creation.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    name: String,
    store_id: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            store_id: StoreId::new(row.store_id),
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Parameters for creating a store login.
#[derive(Debug)]
pub struct CreateUser<'a> {
    /// Login email (the shop's contact email).
    pub email: &'a str,
    /// Argon2 hash of the generated password.
    pub password_hash: &'a str,
    /// Display name (the shop's display name).
    pub name: &'a str,
    /// Owning store.
    pub store_id: StoreId,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a store already has a login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for_store(&self, store_id: StoreId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM gateway.store_user WHERE store_id = $1)",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create the login for a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store already has a login.
    /// Returns `RepositoryError::Database` for other database errors.
    /// Returns `RepositoryError::DataCorruption` if the returned data is invalid.
    pub async fn create(&self, params: &CreateUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO gateway.store_user (email, password_hash, name, store_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, store_id, created_at",
        )
        .bind(params.email)
        .bind(params.password_hash)
        .bind(params.name)
        .bind(params.store_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("store already has a login".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }
}
