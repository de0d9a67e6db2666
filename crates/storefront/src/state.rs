//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use boutique_core::Location;
use boutique_core::client::{ApiClient, ApiError};
use moka::future::Cache;

use crate::config::StorefrontConfig;

/// How long province, district and ward lists stay cached.
const LOCATION_TTL: Duration = Duration::from_secs(3600);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    locations: Cache<String, Arc<Vec<Location>>>,
}

impl AppState {
    /// Build the commerce API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api.base_url, config.api.timeout)?;
        let locations = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(LOCATION_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                locations,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Commerce API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Cached backend location lists, keyed by request path.
    #[must_use]
    pub fn locations(&self) -> &Cache<String, Arc<Vec<Location>>> {
        &self.inner.locations
    }
}
