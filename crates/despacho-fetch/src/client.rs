//! HTTP transport for the provider APIs.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::time::Duration;

use crate::transport::{Request, Transport, TransportError};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Maximum concurrent page requests.
    pub concurrency: usize,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(120), // XM answers slowly on wide pages
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            user_agent: format!("despacho/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Sets the concurrency limit.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the retry limit.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff bounds in milliseconds.
    #[must_use]
    pub const fn with_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP transport with connection pooling and retry logic.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.concurrency)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a transport with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn builder(&self, request: &Request) -> RequestBuilder {
        match &request.body {
            Some(body) => self.client.post(&request.url).json(body),
            None => self.client.get(&request.url),
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // ±25%, derived from the attempt number
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
        Duration::from_millis(final_delay)
    }

    fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }

    async fn backoff(&self, attempt: u32, url: &str, reason: &str) {
        let delay = self.calculate_backoff_delay(attempt);
        tracing::debug!(
            url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason,
            "retrying request"
        );
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> Result<Json, TransportError> {
        let mut attempts = 0;

        loop {
            match self.builder(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            self.backoff(attempts, &request.url, status.as_str()).await;
                            continue;
                        }
                        return Err(TransportError::ServerError {
                            status: status.as_u16(),
                        });
                    }

                    if status.is_client_error() {
                        return Err(TransportError::ServerError {
                            status: status.as_u16(),
                        });
                    }

                    return Ok(response.json::<Json>().await?);
                }
                Err(e) if Self::is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    self.backoff(attempts, &request.url, "connection").await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
