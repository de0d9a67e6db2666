//! Application state shared across handlers.

use std::sync::Arc;

use boutique_core::client::{ApiClient, ApiError, GeoClient, GeoError};

use crate::config::AdminConfig;

/// Failure building the outbound HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("commerce API client: {0}")]
    Api(#[from] ApiError),
    #[error("geography client: {0}")]
    Geo(#[from] GeoError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    geo: GeoClient,
}

impl AppState {
    /// Build the commerce API and geography clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either base URL is invalid.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api.base_url, config.api.timeout)?;
        let geo = GeoClient::new(&config.provinces_api_url, config.api.timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api, geo }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Commerce API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Geography lookups for the shipping-info editor.
    #[must_use]
    pub fn geo(&self) -> &GeoClient {
        &self.inner.geo
    }
}
