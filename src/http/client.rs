//! HTTP client with credential injection and transport retries
//!
//! Every request:
//! - carries `Accept`/`Content-Type: application/json` and, when a token is
//!   stored, `Authorization: Bearer <token>`
//! - is re-sent after a fixed delay when no response arrives, up to a
//!   bounded number of retries
//! - has its response classified into success or one error kind
//!
//! A 401 evicts the stored credentials once per request chain and is never
//! retried.

use super::response::{decode_body, ApiResponse};
use super::throttle::{Throttle, ThrottleConfig};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of re-sends after a no-response failure
    pub max_retries: u32,
    /// Fixed delay between re-sends
    pub retry_delay: Duration,
    /// Optional client-side throttle
    pub throttle: Option<ThrottleConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            throttle: None,
            default_headers,
            user_agent: format!("storefront-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the delay between retries
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Enable the client-side throttle
    pub fn throttle(mut self, config: ThrottleConfig) -> Self {
        self.config.throttle = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
///
/// Also carries the markers of its request chain: how many transport
/// retries it has used and whether it already evicted credentials. Passing
/// the same config back into [`HttpClient::send`] continues that chain.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
    /// Transport retries already spent on this chain
    pub retry_count: u32,
    /// Set once the chain has evicted credentials after a 401
    pub auth_evicted: bool,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Mark this request as already retried by an outer layer
    #[must_use]
    pub fn mark_retried(mut self) -> Self {
        self.retry_count = u32::MAX;
        self
    }
}

/// HTTP client with credential injection and transport retries
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: Option<Credentials>,
    throttle: Option<Throttle>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let throttle = config.throttle.map(Throttle::new).transpose()?;

        Ok(Self {
            client,
            config,
            credentials: None,
            throttle,
        })
    }

    /// Create a client that injects stored credentials
    pub fn with_credentials(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.credentials = Some(credentials);
        Ok(client)
    }

    /// Set the credentials handle
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// The credentials handle, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::GET, url, RequestConfig::default())
            .await
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<ApiResponse> {
        self.request(Method::GET, url, config).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, body: Value) -> Result<ApiResponse> {
        self.request(Method::POST, url, RequestConfig::default().json(body))
            .await
    }

    /// Make a request, starting a new request chain
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        mut config: RequestConfig,
    ) -> Result<ApiResponse> {
        self.send(method, url, &mut config).await
    }

    /// Make a request as part of an existing request chain
    ///
    /// The chain markers in `config` are updated in place, so re-sending
    /// the same config never exceeds the retry budget and never evicts
    /// credentials twice.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        config: &mut RequestConfig,
    ) -> Result<ApiResponse> {
        let full_url = self.build_url(url);
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        loop {
            if let Some(ref throttle) = self.throttle {
                throttle.acquire().await;
            }

            let req = self.build_request(&method, &full_url, config, timeout).await;
            debug!(
                method = %method,
                url = %full_url,
                attempt = config.retry_count.saturating_add(1),
                "Sending request"
            );

            let err = match req.send().await {
                Ok(response) => {
                    match self
                        .classify(&method, &full_url, response, config, timeout)
                        .await
                    {
                        Err(err) if err.kind().is_transport_retryable() => err,
                        other => return other,
                    }
                }
                Err(e) => transport_error(e, timeout),
            };

            if !err.kind().is_transport_retryable() {
                return Err(err);
            }

            if config.retry_count >= max_retries {
                if max_retries > 0 && config.retry_count != u32::MAX {
                    error!("Max retries ({max_retries}) reached for {method} {full_url}: {err}");
                }
                return Err(err);
            }

            config.retry_count += 1;
            warn!(
                "{err}, retry {}/{} for {method} {full_url} in {:?}",
                config.retry_count, max_retries, self.config.retry_delay
            );
            tokio::time::sleep(self.config.retry_delay).await;
        }
    }

    /// Make a request and deserialize the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get(url).await?.json()
    }

    /// Assemble one attempt of a request
    async fn build_request(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method.clone(), url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        if let Some(ref body) = config.body {
            req = req.json(body);
        }

        req = req.timeout(timeout);

        match self.credentials {
            Some(ref credentials) => credentials.apply(req).await,
            None => req,
        }
    }

    /// Turn a received response into a success or a classified error
    ///
    /// The status decides the outcome. A body that cannot be read fails a
    /// success like a lost connection, and is treated as empty otherwise.
    async fn classify(
        &self,
        method: &Method,
        url: &str,
        response: Response,
        config: &mut RequestConfig,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => {
                warn!("Failed to read response body for {method} {url}: {e}");
                return Err(transport_error(e, timeout));
            }
            Err(e) => {
                warn!(
                    status = status.as_u16(),
                    "Failed to read error body for {method} {url}: {e}"
                );
                String::new()
            }
        };

        if status.is_success() {
            debug!(status = status.as_u16(), url = %url, "Request succeeded: {method}");
            return Ok(ApiResponse {
                status: status.as_u16(),
                body: decode_body(&text),
            });
        }

        let err = Error::from_status(status.as_u16(), text);
        match &err {
            Error::Unauthorized => {
                if !config.auth_evicted {
                    config.auth_evicted = true;
                    if let Some(ref credentials) = self.credentials {
                        if let Err(e) = credentials.evict().await {
                            warn!("Failed to clear credentials after 401: {e}");
                        }
                    }
                }
            }
            Error::Forbidden => warn!("Access forbidden: {method} {url}"),
            Error::Server { status, .. } => warn!("Server error {status}: {method} {url}"),
            _ => debug!(status = status.as_u16(), url = %url, "Request failed: {method}"),
        }
        Err(err)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_credentials", &self.credentials.is_some())
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}

/// Classify a failure where no response was received
fn transport_error(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if e.is_builder() || e.is_redirect() {
        Error::Http(e)
    } else {
        Error::network(e.to_string())
    }
}
