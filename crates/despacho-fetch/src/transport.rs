//! The request seam between the retrieval core and the network.

use async_trait::async_trait;
use serde_json::Value as Json;
use std::sync::Arc;
use thiserror::Error;

/// A provider request: GET when there is no body, JSON POST otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Fully built request URL.
    pub url: String,
    /// JSON body for POST requests.
    pub body: Option<Json>,
}

impl Request {
    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
        }
    }

    /// Creates a JSON POST request.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Json) -> Self {
        Self {
            url: url.into(),
            body: Some(body),
        }
    }

    /// Returns the HTTP method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        if self.body.is_some() { "POST" } else { "GET" }
    }
}

/// Errors that can occur while sending a request.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// The provider could not serve the request.
    #[error("Provider error: {0}")]
    Api(String),
}

/// Sends provider requests and returns the decoded JSON response.
///
/// [`crate::HttpTransport`] is the network implementation; tests substitute
/// an in-memory one.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request.
    async fn send(&self, request: &Request) -> Result<Json, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &Request) -> Result<Json, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: &Request) -> Result<Json, TransportError> {
        (**self).send(request).await
    }
}
