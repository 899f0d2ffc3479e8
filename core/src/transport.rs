//! The network boundary of the pipeline.
//!
//! # Design
//! `Transport` performs exactly one HTTP exchange and does not interpret the
//! body. Any response the server produced, 5xx included, is an `Ok`; only
//! failures before a response exists (DNS, connect, reset, timeout) are a
//! `TransportError`. The dispatcher holds the transport as
//! `Arc<dyn Transport>`, so tests swap in scripted transports without
//! touching the pipeline.

use std::time::Duration;

use async_trait::async_trait;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that happen before an HTTP response exists.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport failure: {0}")]
    Other(#[source] BoxError),
}

/// Sends a single request and yields the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Other(e.into()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(reqwest_method(method), &url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.form(body.fields());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify(e, &url))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|e| classify(e, &url))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn classify(error: reqwest::Error, url: &str) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            source: error.into(),
        }
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Other(error.into())
    }
}
