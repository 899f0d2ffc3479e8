//! The shared request pipeline every endpoint runs through.
//!
//! # Design
//! `Dispatcher::send` is the only place that talks to the transport. It
//! merges the header store snapshot under the request's own headers, issues
//! exactly one network operation, and routes the response by comparing its
//! status with the endpoint's expected status:
//!
//! - expected status, no-content convention (204): sentinel value, body ignored
//! - expected status otherwise: decode the body into `T`
//! - any other status: translate the body into an `ApiError::Api`
//!
//! Routing is synchronous and pure (`route`); suspension only happens while
//! awaiting the transport. There is no retry, no cache, and no shared state
//! besides the header store and the base URL, both snapshotted per call.

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::decode::{decode_no_content, decode_payload, translate_error};
use crate::error::ApiError;
use crate::headers::HeaderStore;
use crate::http::{set_header, FormBody, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NO_CONTENT: u16 = 204;

/// A decoded success together with the status line it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitchResponse<T> {
    pub status: u16,
    pub status_text: String,
    pub value: T,
}

impl<T> TwitchResponse<T> {
    /// Reshapes the value, keeping the status line.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TwitchResponse<U> {
        TwitchResponse {
            status: self.status,
            status_text: self.status_text,
            value: f(self.value),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

pub struct Dispatcher {
    base_url: RwLock<String>,
    headers: HeaderStore,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(base_url: &str, headers: HeaderStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: RwLock::new(normalize_base_url(base_url)),
            headers,
            transport,
        }
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_base_url(&self, base_url: &str) {
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) =
            normalize_base_url(base_url);
    }

    /// `base_url` joined with `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }

    /// Issues one request and decodes the outcome into `T`.
    ///
    /// Dropping the returned future before it resolves cancels the request,
    /// including a transport call already in flight. The dispatcher keeps no
    /// per-request state, so later requests are unaffected.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<FormBody>,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        let mut request = HttpRequest::new(method, url);
        request.body = body;
        self.send(request, expected).await
    }

    /// Like [`Dispatcher::request`] for a pre-built request. Headers already on
    /// `request` override the store defaults.
    #[tracing::instrument(
        name = "dispatch",
        skip(self, request),
        fields(method = %request.method, url = %request.url)
    )]
    pub async fn send<T: DeserializeOwned>(
        &self,
        mut request: HttpRequest,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        let mut headers = self.headers.snapshot();
        for (name, value) in std::mem::take(&mut request.headers) {
            set_header(&mut headers, name, value);
        }
        request.headers = headers;

        debug!("dispatching request");
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "transport failure");
                return Err(e.into());
            }
        };
        debug!(status = response.status, bytes = response.body.len(), "response received");

        route(response, expected)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        self.request(HttpMethod::Get, url, None, expected).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<FormBody>,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        self.request(HttpMethod::Put, url, body, expected).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: Option<FormBody>,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        self.request(HttpMethod::Post, url, body, expected).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        expected: u16,
    ) -> Result<TwitchResponse<T>, ApiError> {
        self.request(HttpMethod::Delete, url, None, expected).await
    }
}

/// Maps a raw response onto the endpoint's expectation.
pub fn route<T: DeserializeOwned>(
    response: HttpResponse,
    expected: u16,
) -> Result<TwitchResponse<T>, ApiError> {
    let HttpResponse {
        status,
        status_text,
        body,
        ..
    } = response;

    if status != expected {
        let message = match translate_error(&body) {
            Ok(payload) => payload.message,
            Err(e) => {
                warn!(status, error = %e, "unparsable error body");
                fallback_message(status, &status_text)
            }
        };
        return Err(ApiError::Api {
            status,
            status_text,
            message,
        });
    }

    let decoded = if expected == STATUS_NO_CONTENT {
        decode_no_content()
    } else {
        decode_payload(&body)
    };
    match decoded {
        Ok(value) => Ok(TwitchResponse {
            status,
            status_text,
            value,
        }),
        Err(source) => Err(ApiError::Decode {
            status,
            status_text,
            source,
        }),
    }
}

fn fallback_message(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        format!("HTTP {status}")
    } else {
        status_text.to_string()
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
