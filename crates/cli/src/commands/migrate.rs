//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Run gateway migrations
//! shopkeeper-cli migrate gateway
//! ```
//!
//! # Environment Variables
//!
//! - `GATEWAY_DATABASE_URL` - `PostgreSQL` connection string for the
//!   gateway (falls back to `DATABASE_URL`)

use sqlx::PgPool;

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run gateway database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn gateway() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("GATEWAY_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("GATEWAY_DATABASE_URL"))?;

    tracing::info!("Connecting to gateway database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running gateway migrations...");
    sqlx::migrate!("../gateway/migrations").run(&pool).await?;

    tracing::info!("Gateway migrations complete!");
    Ok(())
}
