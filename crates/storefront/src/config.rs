//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BOUTIQUE_API_URL` - Commerce API root (e.g. `http://localhost:8000/api/v1`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BOUTIQUE_API_TIMEOUT_SECS` - Commerce API timeout (default: 10)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use boutique_core::config::{self as env, ApiConfig, SentryConfig};
use secrecy::SecretString;

pub use boutique_core::config::ConfigError;

const DEFAULT_PORT: u16 = 3000;

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Commerce API connection
    pub api: ApiConfig,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("session_secret", &"[REDACTED]")
            .field("api", &self.api)
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, malformed, or
    /// the session secret is weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        env::load_dotenv();

        Ok(Self {
            host: env::parsed_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: env::parsed_or("STOREFRONT_PORT", DEFAULT_PORT)?,
            base_url: env::required("STOREFRONT_BASE_URL")?,
            session_secret: env::session_secret("STOREFRONT_SESSION_SECRET")?,
            api: ApiConfig::from_env()?,
            sentry: SentryConfig::from_env(),
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn sample() -> StorefrontConfig {
        StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("Zx8!pQ3@wE6#rT9$yU2%iO5^aS7&dF4*"),
            api: ApiConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                timeout: Duration::from_secs(10),
            },
            sentry: SentryConfig::default(),
        }
    }

    #[test]
    fn test_socket_addr_binds_all_interfaces() {
        let addr = sample().socket_addr();
        assert!(addr.ip().is_unspecified());
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_https_detection() {
        let mut config = sample();
        assert!(!config.is_https());
        config.base_url = "https://boutique.vn".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_storefront_config_debug_redacts_session_secret() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("Zx8!pQ3"));
    }
}
