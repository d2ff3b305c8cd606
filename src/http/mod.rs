//! HTTP transport module
//!
//! Provides the HTTP client every resource fetcher rides on.
//!
//! # Features
//!
//! - **Bearer Injection**: Token read from the credential store per request
//! - **Response Classification**: Status codes mapped onto the error taxonomy
//! - **Transport Retries**: Bounded re-sends with a fixed delay when no response arrives
//! - **Credential Eviction**: Stored token and profile cleared on 401
//! - **Lenient Bodies**: Empty and non-JSON success bodies never fail decoding
//! - **Throttling**: Optional token bucket using governor

mod client;
mod response;
mod throttle;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use response::{decode_body, ApiResponse};
pub use throttle::{Throttle, ThrottleConfig};
