//! Environment-variable helpers shared by the web applications.
//!
//! Both binaries read their configuration from the process environment
//! (optionally seeded from a `.env` file) and validate their session secrets
//! the same way, so the plumbing lives here.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Minimum length of a session signing secret.
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Commerce API timeout when `BOUTIQUE_API_TIMEOUT_SECS` is unset.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Minimum Shannon entropy of a secret, in bits per character.
pub const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as a copy-pasted placeholder (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Load `.env` from the working directory if there is one.
pub fn load_dotenv() {
    // A missing file is the normal case in production.
    let _ = dotenvy::dotenv();
}

/// Read a variable that must be set.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when the variable is unset.
pub fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read a variable that may be unset. Empty values count as unset.
#[must_use]
pub fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a variable and parse it, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] when the value does not parse.
pub fn parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Read and validate a session signing secret: long enough, not a
/// placeholder, and random-looking.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] or [`ConfigError::InsecureSecret`].
pub fn session_secret(key: &str) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(required(key)?);
    check_secret_length(&secret, key)?;
    check_secret_strength(secret.expose_secret(), key)?;
    Ok(secret)
}

fn check_secret_length(secret: &SecretString, key: &str) -> Result<(), ConfigError> {
    let len = secret.expose_secret().len();
    if len < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Reject placeholder values and low-entropy strings.
///
/// # Errors
///
/// Returns [`ConfigError::InsecureSecret`] describing the failed check.
pub fn check_secret_strength(secret: &str, key: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let total = s.chars().count() as f64;
    counts
        .values()
        .map(|&n| {
            #[allow(clippy::cast_precision_loss)]
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Commerce API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Read `BOUTIQUE_API_URL` and `BOUTIQUE_API_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or the timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: required("BOUTIQUE_API_URL")?,
            timeout: Duration::from_secs(parsed_or(
                "BOUTIQUE_API_TIMEOUT_SECS",
                DEFAULT_API_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Sentry settings shared by both binaries.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Error tracking DSN; Sentry stays off when unset.
    pub dsn: Option<String>,
    /// Environment tag (e.g. "staging", "production").
    pub environment: Option<String>,
    /// Error sample rate (0.0 to 1.0).
    pub sample_rate: f32,
    /// Traces sample rate (0.0 to 1.0).
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    /// Read `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE` and
    /// `SENTRY_TRACES_SAMPLE_RATE`. Unparseable rates fall back to 1.0.
    #[must_use]
    pub fn from_env() -> Self {
        let rate = |key| {
            optional(key)
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0)
        };
        Self {
            dsn: optional("SENTRY_DSN"),
            environment: optional("SENTRY_ENVIRONMENT"),
            sample_rate: rate("SENTRY_SAMPLE_RATE"),
            traces_sample_rate: rate("SENTRY_TRACES_SAMPLE_RATE"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!(shannon_entropy("zzzzzz").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("Qm7#vT2!kP9$wX4&") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_placeholder_secrets_rejected() {
        for value in ["your-session-key", "CHANGEME-now-please", "put-your-key-here"] {
            let err = check_secret_strength(value, "ADMIN_SESSION_SECRET").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(ref key, _) if key == "ADMIN_SESSION_SECRET"));
        }
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        assert!(check_secret_strength(&"ab".repeat(20), "K").is_err());
        assert!(check_secret_strength("Qm7#vT2!kP9$wX4&zR8@nB3^hJ6*cL1%", "K").is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let short = SecretString::from("Qm7#vT2!kP9$");
        assert!(check_secret_length(&short, "K").is_err());
        let long = SecretString::from("Qm7#vT2!kP9$wX4&zR8@nB3^hJ6*cL1%");
        assert!(check_secret_length(&long, "K").is_ok());
    }
}
