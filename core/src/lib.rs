//! Typed, asynchronous client core for the versioned Twitch REST API.
//!
//! # Overview
//! Every endpoint runs through one pipeline: build a request, merge the
//! default headers, send it through a [`Transport`], then either decode the
//! body into the endpoint's target type or translate it into an
//! [`ApiError`].
//!
//! # Design
//! - [`HeaderStore`] holds the Accept, Authorization and Client-ID defaults;
//!   each dispatch takes a snapshot.
//! - [`Transport`] is a trait so tests can script responses;
//!   [`ReqwestTransport`] is the production implementation.
//! - [`Dispatcher`] compares the received status with the endpoint's
//!   expected status and owns all success/failure routing.
//! - Endpoint handles ([`Channels`], [`Games`]) only build URLs and bodies.

pub mod channels;
pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod games;
pub mod headers;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use channels::Channels;
pub use client::TwitchClient;
pub use config::{ClientConfig, ConfigError};
pub use decode::{DecodeError, ErrorPayload};
pub use dispatch::{Dispatcher, TwitchResponse, STATUS_NO_CONTENT, STATUS_OK};
pub use error::ApiError;
pub use games::Games;
pub use headers::HeaderStore;
pub use http::{FormBody, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{
    Channel, ChannelSubscription, ChannelSubscriptions, ChannelUpdate, Direction, Empty, Follow,
    Game, Team, TopGame, TopGames, User, UserFollows, Video, Videos,
};
