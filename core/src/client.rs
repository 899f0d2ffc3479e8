//! Client facade over the dispatcher.
//!
//! # Design
//! `TwitchClient` owns the single `Dispatcher` (behind an `Arc` so clones
//! share headers and base URL). Resource handles such as `channels()` borrow
//! the dispatcher; they hold no state of their own. Configuration setters
//! take effect on the next dispatched request.

use std::sync::Arc;

use crate::channels::Channels;
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::games::Games;
use crate::headers::HeaderStore;
use crate::transport::{ReqwestTransport, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct TwitchClient {
    dispatcher: Arc<Dispatcher>,
}

impl TwitchClient {
    /// Client using the reqwest transport.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let headers = HeaderStore::with_api_version(config.api_version);
        headers.set_auth_token(config.auth_token.as_deref());
        headers.set_client_id(config.client_id.as_deref());
        Self {
            dispatcher: Arc::new(Dispatcher::new(&config.base_url, headers, transport)),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn headers(&self) -> &HeaderStore {
        self.dispatcher.headers()
    }

    pub fn base_url(&self) -> String {
        self.dispatcher.base_url()
    }

    pub fn set_base_url(&self, base_url: &str) {
        self.dispatcher.set_base_url(base_url);
    }

    pub fn set_api_version(&self, api_version: u32) {
        self.headers().set_api_version(api_version);
    }

    /// `None`, empty or blank clears the token.
    pub fn set_auth_token(&self, token: Option<&str>) {
        self.headers().set_auth_token(token);
    }

    /// `None`, empty or blank clears the client id.
    pub fn set_client_id(&self, client_id: Option<&str>) {
        self.headers().set_client_id(client_id);
    }

    pub fn channels(&self) -> Channels<'_> {
        Channels::new(&self.dispatcher)
    }

    pub fn games(&self) -> Games<'_> {
        Games::new(&self.dispatcher)
    }
}
