//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{config::GatewayConfig, jobs::JobQueue, services::EmailService, shopify};

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    pool: PgPool,
    shopify: shopify::Client,
    jobs: JobQueue,
    email: Option<EmailService>,
}

impl AppState {
    /// Assemble the application state.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        pool: PgPool,
        shopify: shopify::Client,
        jobs: JobQueue,
        email: Option<EmailService>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
                jobs,
                email,
            }),
        }
    }

    /// Gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Shopify platform API client.
    #[must_use]
    pub fn shopify(&self) -> &shopify::Client {
        &self.inner.shopify
    }

    /// Webhook-configuration job queue.
    #[must_use]
    pub fn jobs(&self) -> &JobQueue {
        &self.inner.jobs
    }

    /// Email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
