//! Application state shared across handlers.

use std::sync::Arc;

use crate::bigcommerce::BigCommerceClient;
use crate::config::AppConfig;
use crate::db::StoreRepository;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the store repository, and the BigCommerce client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    stores: Arc<dyn StoreRepository>,
    bigcommerce: BigCommerceClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `stores` - Store record repository
    #[must_use]
    pub fn new(config: AppConfig, stores: Arc<dyn StoreRepository>) -> Self {
        let bigcommerce = BigCommerceClient::new(&config.bigcommerce);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                bigcommerce,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the store repository.
    #[must_use]
    pub fn stores(&self) -> &dyn StoreRepository {
        self.inner.stores.as_ref()
    }

    /// Get a reference to the BigCommerce API client.
    #[must_use]
    pub fn bigcommerce(&self) -> &BigCommerceClient {
        &self.inner.bigcommerce
    }
}
