//! Subcommand implementations.

pub mod health;
pub mod login;
pub mod provinces;
pub mod statuses;

use boutique_core::client::{ApiClient, ApiError, GeoError, LoginError};
use boutique_core::config::{self as env, ApiConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Commerce API call failed.
    #[error("Commerce API error: {0}")]
    Api(#[from] ApiError),

    /// Login was refused.
    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    /// Provinces API call failed.
    #[error("Provinces API error: {0}")]
    Geo(#[from] GeoError),

    /// The command ran but found a problem worth a non-zero exit.
    #[error("{0}")]
    Check(String),
}

/// Commerce API client from `BOUTIQUE_API_URL`.
///
/// # Errors
///
/// Returns an error if the URL is missing or invalid.
pub fn api_client() -> Result<ApiClient, CliError> {
    env::load_dotenv();
    let config = ApiConfig::from_env()?;
    Ok(ApiClient::new(&config.base_url, config.timeout)?)
}
