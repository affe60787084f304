//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! tuning constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default Moltin API root
pub const DEFAULT_MOLTIN_BASE_URL: &str = "https://api.moltin.com";
/// Default Redis port
pub const DEFAULT_REDIS_PORT: u16 = 6379;
/// Default timeout for commerce backend HTTP calls
pub const DEFAULT_COMMERCE_HTTP_TIMEOUT_SECS: u64 = 30;

// Telegram send retries
/// Initial backoff for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff between Telegram API retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Maximum retry attempts for Telegram API calls
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

// Redelivery guard
/// How long a processed update id is remembered
pub const REDELIVERY_CACHE_TTL_SECS: u64 = 600;
/// Maximum number of remembered update ids
pub const REDELIVERY_CACHE_MAX_SIZE: u64 = 10_000;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Moltin client id used for the implicit token grant
    pub moltin_client_id: String,
    /// Moltin API root URL
    #[serde(default = "default_moltin_base_url")]
    pub moltin_base_url: String,

    /// Redis host for session state; in-memory sessions when absent
    pub redis_host: Option<String>,
    /// Redis port
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    /// Redis password
    pub redis_password: Option<String>,

    /// Timeout for a single commerce backend call
    #[serde(default = "default_commerce_http_timeout_secs")]
    pub commerce_http_timeout_secs: u64,
}

fn default_moltin_base_url() -> String {
    DEFAULT_MOLTIN_BASE_URL.to_string()
}

const fn default_redis_port() -> u16 {
    DEFAULT_REDIS_PORT
}

const fn default_commerce_http_timeout_secs() -> u64 {
    DEFAULT_COMMERCE_HTTP_TIMEOUT_SECS
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a required key is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // UPPER_SNAKE_CASE env vars map to snake_case keys; empty values count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    /// Connection URL for the session Redis, if a host is configured
    #[must_use]
    pub fn redis_url(&self) -> Option<String> {
        let host = self.redis_host.as_deref().filter(|h| !h.is_empty())?;
        let auth = self
            .redis_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!(":{p}@"))
            .unwrap_or_default();
        Some(format!("redis://{auth}{host}:{}/", self.redis_port))
    }
}

/// Get redelivery cache TTL from env or default.
///
/// Environment variable: `REDELIVERY_CACHE_TTL_SECS`.
#[must_use]
pub fn get_redelivery_cache_ttl() -> u64 {
    std::env::var("REDELIVERY_CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(REDELIVERY_CACHE_TTL_SECS)
}

/// Get redelivery cache max size from env or default.
///
/// Environment variable: `REDELIVERY_CACHE_MAX_SIZE`.
#[must_use]
pub fn get_redelivery_cache_max_size() -> u64 {
    std::env::var("REDELIVERY_CACHE_MAX_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(REDELIVERY_CACHE_MAX_SIZE)
}
