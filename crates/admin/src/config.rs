//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin console
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BOUTIQUE_API_URL` - Commerce API root (e.g. `http://localhost:8000/api/v1`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `BOUTIQUE_API_TIMEOUT_SECS` - Commerce API timeout (default: 10)
//! - `PROVINCES_API_URL` - Geography API root (default: `https://provinces.open-api.vn/api/`)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use boutique_core::client::geo;
use boutique_core::config::{self as env, ApiConfig, SentryConfig};
use secrecy::SecretString;

pub use boutique_core::config::ConfigError;

const DEFAULT_PORT: u16 = 3001;

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin console
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Commerce API connection
    pub api: ApiConfig,
    /// Geography API root used by the shipping-info pickers
    pub provinces_api_url: String,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("session_secret", &"[REDACTED]")
            .field("api", &self.api)
            .field("provinces_api_url", &self.provinces_api_url)
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, malformed, or
    /// the session secret is weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        env::load_dotenv();

        Ok(Self {
            host: env::parsed_or("ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: env::parsed_or("ADMIN_PORT", DEFAULT_PORT)?,
            base_url: env::required("ADMIN_BASE_URL")?,
            session_secret: env::session_secret("ADMIN_SESSION_SECRET")?,
            api: ApiConfig::from_env()?,
            provinces_api_url: env::optional("PROVINCES_API_URL")
                .unwrap_or_else(|| geo::DEFAULT_BASE_URL.to_string()),
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

    fn sample() -> AdminConfig {
        AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("Qm7#vT2!kP9$wX4&zR8@nB3^hJ6*cL1%"),
            api: ApiConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                timeout: Duration::from_secs(10),
            },
            provinces_api_url: geo::DEFAULT_BASE_URL.to_string(),
            sentry: SentryConfig::default(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_https_detection() {
        let mut config = sample();
        assert!(!config.is_https());
        config.base_url = "https://admin.boutique.vn".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_admin_config_debug_redacts_session_secret() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("Qm7#vT2"));
        assert!(debug.contains("localhost:8000"));
    }
}
