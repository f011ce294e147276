//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::media::MediaError;
use crate::services::{Catalog, MediaClient, PaymentGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Catalog,
    media: Option<MediaClient>,
    payment: PaymentGateway,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the image host client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, MediaError> {
        let catalog = Catalog::new(pool.clone());
        let media = config.media.clone().map(MediaClient::new).transpose()?;
        let payment = PaymentGateway::new(config.payment);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                media,
                payment,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Image host client, if configured.
    #[must_use]
    pub fn media(&self) -> Option<&MediaClient> {
        self.inner.media.as_ref()
    }

    /// Simulated payment gateway.
    #[must_use]
    pub fn payment(&self) -> &PaymentGateway {
        &self.inner.payment
    }
}
