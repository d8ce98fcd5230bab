//! Application configuration loaded from environment variables.
//!
//! The configuration is built once at startup and shared with every handler
//! through [`crate::state::AppState`].
//!
//! # Environment Variables
//!
//! ## Required
//! - `APP_CLIENT_ID` - BigCommerce app client ID
//! - `APP_CLIENT_SECRET` - BigCommerce app client secret (signs load payloads)
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `DEBUG` - `True` enables debug logging, including SQL statements
//! - `LISTEN_HOST` - Bind address (default: 0.0.0.0)
//! - `LISTEN_PORT` - Listen port (default: 5000)
//! - `APP_URL` - Public URL of this app (default: <http://localhost:5000>)
//! - `BIGCOMMERCE_API_URL` - REST API base (default: <https://api.bigcommerce.com>)
//! - `BIGCOMMERCE_LOGIN_URL` - OAuth base (default: <https://login.bigcommerce.com>)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use orderman_core::StoreId;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_API_URL: &str = "https://api.bigcommerce.com";
const DEFAULT_LOGIN_URL: &str = "https://login.bigcommerce.com";

/// Path of the OAuth callback route, relative to `APP_URL`.
pub const CALLBACK_PATH: &str = "/bigcommerce/callback";

/// Blocklist of common placeholder patterns (case-insensitive)
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

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Orderman application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbose logging (request tracing and SQL statements)
    pub debug: bool,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of the app, used for OAuth redirects
    pub app_url: Url,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// BigCommerce API configuration
    pub bigcommerce: BigCommerceConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// BigCommerce app credentials and endpoints.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct BigCommerceConfig {
    /// App client ID
    pub client_id: String,
    /// App client secret
    pub client_secret: SecretString,
    /// REST API base URL
    pub api_url: Url,
    /// OAuth login service base URL
    pub login_url: Url,
}

impl std::fmt::Debug for BigCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigCommerceConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_url", &self.api_url.as_str())
            .field("login_url", &self.login_url.as_str())
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the client secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let debug = get_optional_env("DEBUG").is_some_and(|v| v == "True");
        let host = get_env_or_default("LISTEN_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTEN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LISTEN_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTEN_PORT".to_string(), e.to_string()))?;
        let app_url = get_url_or_default("APP_URL", "http://localhost:5000")?;
        let database_url = get_required_secret("DATABASE_URL")?;

        let bigcommerce = BigCommerceConfig::from_env()?;
        let log_format = match get_optional_env("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            debug,
            host,
            port,
            app_url,
            database_url,
            bigcommerce,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The OAuth redirect URI registered with BigCommerce.
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!(
            "{}{CALLBACK_PATH}",
            self.app_url.as_str().trim_end_matches('/')
        )
    }

    /// The app landing page for a resolved store.
    #[must_use]
    pub fn store_landing_url(&self, store_id: StoreId) -> String {
        let mut url = self.app_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("storeId", &store_id.to_string());
        url.into()
    }
}

impl BigCommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("APP_CLIENT_ID")?,
            client_secret: get_validated_secret("APP_CLIENT_SECRET")?,
            api_url: get_url_or_default("BIGCOMMERCE_API_URL", DEFAULT_API_URL)?,
            login_url: get_url_or_default("BIGCOMMERCE_LOGIN_URL", DEFAULT_LOGIN_URL)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an absolute URL from the environment, falling back to a default.
fn get_url_or_default(key: &str, default: &str) -> Result<Url, ConfigError> {
    let value = get_env_or_default(key, default);
    Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the BigCommerce developer portal."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
impl AppConfig {
    /// A complete configuration for unit tests.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn for_tests(app_url: &str) -> Self {
        Self {
            debug: false,
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            app_url: Url::parse(app_url).unwrap(),
            database_url: SecretString::from("postgres://localhost/orderman"),
            bigcommerce: BigCommerceConfig {
                client_id: "client_id_value".to_string(),
                client_secret: SecretString::from("super_secret_client_secret"),
                api_url: Url::parse(DEFAULT_API_URL).unwrap(),
                login_url: Url::parse(DEFAULT_LOGIN_URL).unwrap(),
            },
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}
