//! Error types for storefront-fetch
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every error maps onto one [`ErrorKind`], which is what the controllers use
//! to decide on retries and what the UI gets a localized message for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for storefront-fetch
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors (no response received)
    // ============================================================================
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // HTTP Status Errors
    // ============================================================================
    #[error("Unauthorized (HTTP 401)")]
    Unauthorized,

    #[error("Forbidden (HTTP 403)")]
    Forbidden,

    #[error("Not found (HTTP 404)")]
    NotFound,

    #[error("Server error HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        /// User-facing hint, e.g. "retry"
        hint: Option<String>,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("HTTP client error: {0}")]
    Http(reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Classification of errors as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received (connection failure, timeout)
    Network,
    /// 5xx response
    Server,
    /// 401 response
    Unauthorized,
    /// 403 response
    Forbidden,
    /// 404 response
    NotFound,
    /// Malformed success envelope or rejected input (400/422)
    Validation,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Whether the transport should re-send the request
    pub fn is_transport_retryable(self) -> bool {
        matches!(self, Self::Network)
    }

    /// Whether a controller may retry the whole fetch
    ///
    /// Network errors reaching a controller have already exhausted the
    /// transport's retries and are terminal.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Server | Self::Unknown)
    }

    /// Stable identifier used in logs and JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Server => "server",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a validation error without a hint
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: None,
        }
    }

    /// Create a validation error carrying a user-facing hint
    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Map an HTTP status and body onto the error taxonomy
    ///
    /// Only meaningful for non-2xx statuses.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 | 422 => Self::Validation {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                hint: None,
            },
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Server { status, body },
            _ => Self::UnexpectedStatus { status, body },
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } | Error::Timeout { .. } => ErrorKind::Network,
            Error::Unauthorized => ErrorKind::Unauthorized,
            Error::Forbidden => ErrorKind::Forbidden,
            Error::NotFound => ErrorKind::NotFound,
            Error::Server { .. } => ErrorKind::Server,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Http(e) if e.is_timeout() || e.is_connect() => ErrorKind::Network,
            _ => ErrorKind::Unknown,
        }
    }

    /// Whether repeating the same request could succeed
    ///
    /// Follows [`ErrorKind::is_transient`], except for failures that would
    /// recur on every attempt: malformed requests, redirect loops and bad
    /// configuration.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) if e.is_builder() || e.is_redirect() => false,
            Error::Config { .. } | Error::YamlParse(_) | Error::InvalidUrl(_) => false,
            _ => self.kind().is_transient(),
        }
    }

    /// The user-facing hint, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::Validation { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Self::Network {
                message: e.to_string(),
            }
        } else {
            Self::Http(e)
        }
    }
}

/// Result type alias for storefront-fetch
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
