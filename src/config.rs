//! Application configuration
//!
//! Settings for the transport, the pagination controllers, the credential
//! store and the UI locale. Every field has a default, so an empty file (or
//! no file at all) is a valid configuration.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, ThrottleConfig};
use crate::messages::Locale;
use crate::pagination::PaginationOptions;
use crate::retry::RetryPolicy;
use crate::types::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Environment variable that overrides `api.base_url`
pub const BASE_URL_ENV: &str = "STOREFRONT_API_URL";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pagination controller settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Credential store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// UI language
    #[serde(default)]
    pub locale: Locale,
}

impl AppConfig {
    /// Load from a YAML or JSON file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content)?,
            Some("yaml" | "yml") | None => Self::from_yaml(&content)?,
            Some(other) => {
                return Err(Error::config(format!(
                    "Unsupported config format '.{other}' (expected .yaml, .yml or .json)"
                )))
            }
        };
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given (defaults otherwise), then apply the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.override_base_url(std::env::var(BASE_URL_ENV).ok())?;
        Ok(config)
    }

    /// Replace `api.base_url` when `base_url` is set and non-blank
    pub fn override_base_url(&mut self, base_url: Option<String>) -> Result<()> {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
            self.validate()?;
        }
        Ok(())
    }

    /// Check field invariants
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "api.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::config("api.timeout_secs must be >= 1"));
        }
        if self.pagination.per_page == 0 {
            return Err(Error::config("pagination.per_page must be >= 1"));
        }
        if self.pagination.initial_page == 0 {
            return Err(Error::config("pagination.initial_page must be >= 1"));
        }
        if self.pagination.max_attempts == 0 {
            return Err(Error::config("pagination.max_attempts must be >= 1"));
        }
        Ok(())
    }

    /// Transport settings
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.api.base_url.clone())
            .timeout(Duration::from_secs(self.api.timeout_secs))
            .max_retries(self.api.max_retries)
            .retry_delay(Duration::from_millis(self.api.retry_delay_ms));
        if let Some(throttle) = self.api.throttle {
            builder = builder.throttle(throttle);
        }
        builder.build()
    }

    /// Controller retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.pagination.max_attempts,
            Duration::from_millis(self.pagination.retry_delay_ms),
        )
    }

    /// Pagination controller settings
    pub fn pagination_options(&self) -> PaginationOptions {
        PaginationOptions {
            per_page: self.pagination.per_page,
            initial_page: self.pagination.initial_page,
            retry: self.retry_policy(),
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport retries after a request that got no response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between transport retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            throttle: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Pagination controller settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// First page number
    #[serde(default = "default_initial_page")]
    pub initial_page: u32,

    /// Total attempts for a transient failure
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            initial_page: default_initial_page(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_initial_page() -> u32 {
    DEFAULT_PAGE
}

fn default_max_attempts() -> u32 {
    3
}

/// Credential store settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the store; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}
