//! Client for the public Vietnamese provinces API.
//!
//! The commerce API's own province, district and ward tables were seeded
//! from this service, so its codes match the `code` column of
//! [`Location`](crate::resources::Location). Divisions change rarely, so
//! every response is cached for an hour.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::resources::{DistrictWithWards, Division, ProvinceWithDistricts};

/// Default base URL of the provinces API.
pub const DEFAULT_BASE_URL: &str = "https://provinces.open-api.vn/api/";

/// How long division lists stay cached.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Errors from the provinces API.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provinces API returned {0}")]
    Status(u16),

    #[error("Invalid provinces API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Cached client for provinces, districts and wards.
#[derive(Clone)]
pub struct GeoClient {
    inner: Arc<GeoClientInner>,
}

struct GeoClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, Arc<Vec<Division>>>,
}

impl GeoClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeoError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(GeoClientInner {
                client: reqwest::Client::builder().timeout(timeout).build()?,
                base_url: Url::parse(&normalized)?,
                cache,
            }),
        })
    }

    /// All provinces.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or answers with an error.
    #[instrument(skip(self))]
    pub async fn provinces(&self) -> Result<Arc<Vec<Division>>, GeoError> {
        let key = "p".to_string();
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!("Cache hit for provinces");
            return Ok(hit);
        }
        let provinces: Vec<Division> = self.fetch("p/").await?;
        Ok(self.store(key, provinces).await)
    }

    /// Districts of a province.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or answers with an error.
    #[instrument(skip(self))]
    pub async fn districts(&self, province_code: i32) -> Result<Arc<Vec<Division>>, GeoError> {
        let key = format!("p/{province_code}");
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!("Cache hit for districts");
            return Ok(hit);
        }
        let province: ProvinceWithDistricts =
            self.fetch(&format!("p/{province_code}?depth=2")).await?;
        Ok(self.store(key, province.districts).await)
    }

    /// Wards of a district.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or answers with an error.
    #[instrument(skip(self))]
    pub async fn wards(&self, district_code: i32) -> Result<Arc<Vec<Division>>, GeoError> {
        let key = format!("d/{district_code}");
        if let Some(hit) = self.inner.cache.get(&key).await {
            debug!("Cache hit for wards");
            return Ok(hit);
        }
        let district: DistrictWithWards =
            self.fetch(&format!("d/{district_code}?depth=2")).await?;
        Ok(self.store(key, district.wards).await)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, GeoError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn store(&self, key: String, divisions: Vec<Division>) -> Arc<Vec<Division>> {
        let divisions = Arc::new(divisions);
        self.inner.cache.insert(key, Arc::clone(&divisions)).await;
        divisions
    }
}

impl std::fmt::Debug for GeoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
