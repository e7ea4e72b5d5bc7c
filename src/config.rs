//! Configuration Module
//!
//! Loads the whole gateway configuration once at startup. Environment
//! dependent defaults (timeouts, TTLs, backoff) are resolved here and nowhere
//! else; the resulting value is threaded through constructors.

use std::env;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Deployment environment, selects the default timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Upstream CMS connection settings.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Base URL of the CMS, without the `/api` suffix
    pub base_url: String,
    /// Optional bearer token
    pub api_token: Option<String>,
    /// Hard timeout for a single upstream request
    pub timeout: Duration,
}

/// Memory cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Runtime switch; a disabled cache always calls through
    pub enabled: bool,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL applied when a call does not supply its own
    pub default_ttl: Duration,
    /// TTL for the site settings document
    pub settings_ttl: Duration,
    /// Interval of the background expiry sweep
    pub cleanup_interval: Duration,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// HTTP server port
    pub server_port: u16,
    pub cms: CmsConfig,
    pub cache: CacheConfig,
    /// When false every upstream call is attempted exactly once
    pub retry_enabled: bool,
    pub retry: RetryPolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `APP_ENV` - `development` (default) or `production`
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CMS_URL` - CMS base URL (default: `http://localhost:1337`)
    /// - `CMS_API_TOKEN` - bearer token (optional)
    /// - `CMS_TIMEOUT_MS` - request timeout (default: 5000 prod / 15000 dev)
    /// - `CACHE_ENABLED` - (default: true)
    /// - `CACHE_MAX_ENTRIES` - (default: 100)
    /// - `CACHE_DEFAULT_TTL_MS` - (default: 300000 prod / 60000 dev)
    /// - `CACHE_SETTINGS_TTL_MS` - (default: 600000 prod / 60000 dev)
    /// - `CACHE_CLEANUP_INTERVAL_MS` - (default: 300000)
    /// - `RETRY_ENABLED` - (default: true)
    /// - `RETRY_MAX_ATTEMPTS` - retries after the first attempt (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - (default: 1000 prod / 500 dev)
    /// - `RETRY_MAX_DELAY_MS` - cap for a single wait (default: 30000)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup("APP_ENV"));
        let prod = environment.is_production();

        let parse = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());
        let millis = |name: &str, default: u64| Duration::from_millis(parse(name).unwrap_or(default));
        let flag = |name: &str, default: bool| {
            lookup(name)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        let base_url = lookup("CMS_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| "http://localhost:1337".to_string());

        Self {
            environment,
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(3000),
            cms: CmsConfig {
                base_url,
                api_token: lookup("CMS_API_TOKEN").filter(|t| !t.trim().is_empty()),
                timeout: millis("CMS_TIMEOUT_MS", if prod { 5_000 } else { 15_000 }),
            },
            cache: CacheConfig {
                enabled: flag("CACHE_ENABLED", true),
                max_entries: parse("CACHE_MAX_ENTRIES")
                    .map(|v| v as usize)
                    .filter(|v| *v > 0)
                    .unwrap_or(100),
                default_ttl: millis("CACHE_DEFAULT_TTL_MS", if prod { 300_000 } else { 60_000 }),
                settings_ttl: millis("CACHE_SETTINGS_TTL_MS", if prod { 600_000 } else { 60_000 }),
                cleanup_interval: Duration::from_millis(
                    parse("CACHE_CLEANUP_INTERVAL_MS")
                        .filter(|v| *v > 0)
                        .unwrap_or(300_000),
                ),
            },
            retry_enabled: flag("RETRY_ENABLED", true),
            retry: RetryPolicy {
                max_retries: parse("RETRY_MAX_ATTEMPTS").map(|v| v as u32).unwrap_or(3),
                base_delay: millis("RETRY_BASE_DELAY_MS", if prod { 1_000 } else { 500 }),
                max_delay: millis("RETRY_MAX_DELAY_MS", 30_000),
            },
        }
    }

    /// Retry policy the content manager should apply.
    pub fn effective_retry(&self) -> RetryPolicy {
        if self.retry_enabled {
            self.retry.clone()
        } else {
            RetryPolicy::disabled()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
