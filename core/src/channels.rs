//! `/channels` endpoints.
//!
//! Each method only builds a URL (and form body), picks the method and
//! expected status, and reshapes the decoded value. Failures pass through
//! untouched.

use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::decode::project_field;
use crate::dispatch::{Dispatcher, TwitchResponse, STATUS_NO_CONTENT, STATUS_OK};
use crate::error::ApiError;
use crate::http::FormBody;
use crate::types::{
    Channel, ChannelSubscription, ChannelSubscriptions, ChannelUpdate, Direction, Empty, Team,
    User, UserFollows, Videos,
};

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SUBSCRIPTION_PAGE_SIZE: u32 = 25;

/// Everything but RFC 3986 unreserved characters is escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

fn segment(value: &str) -> PercentEncode<'_> {
    utf8_percent_encode(value, PATH_SEGMENT)
}

#[derive(Debug, Clone, Copy)]
pub struct Channels<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Channels<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    fn channel_url(&self, name: &str, rest: &str) -> String {
        self.dispatcher
            .url(&format!("/channels/{}{rest}", segment(name)))
    }

    pub async fn get(&self, name: &str) -> Result<TwitchResponse<Channel>, ApiError> {
        self.dispatcher
            .get(&self.channel_url(name, ""), STATUS_OK)
            .await
    }

    /// The channel of the user owning the auth token.
    pub async fn get_authenticated(&self) -> Result<TwitchResponse<Channel>, ApiError> {
        self.dispatcher
            .get(&self.dispatcher.url("/channel"), STATUS_OK)
            .await
    }

    pub async fn editors(&self, name: &str) -> Result<TwitchResponse<Vec<User>>, ApiError> {
        let response = self
            .dispatcher
            .get::<Value>(&self.channel_url(name, "/editors"), STATUS_OK)
            .await?;
        project(response, "users")
    }

    pub async fn update(
        &self,
        name: &str,
        update: &ChannelUpdate,
    ) -> Result<TwitchResponse<Channel>, ApiError> {
        self.dispatcher
            .put(&self.channel_url(name, ""), Some(update.to_form()), STATUS_OK)
            .await
    }

    pub async fn set_status(
        &self,
        name: &str,
        status: &str,
    ) -> Result<TwitchResponse<Channel>, ApiError> {
        self.update(name, &ChannelUpdate::default().status(status))
            .await
    }

    pub async fn set_game(&self, name: &str, game: &str) -> Result<TwitchResponse<Channel>, ApiError> {
        self.update(name, &ChannelUpdate::default().game(game)).await
    }

    pub async fn set_delay(&self, name: &str, delay: u32) -> Result<TwitchResponse<Channel>, ApiError> {
        self.update(name, &ChannelUpdate::default().delay(delay))
            .await
    }

    pub async fn set_status_and_game(
        &self,
        name: &str,
        status: &str,
        game: &str,
    ) -> Result<TwitchResponse<Channel>, ApiError> {
        self.update(name, &ChannelUpdate::default().status(status).game(game))
            .await
    }

    pub async fn reset_stream_key(&self, name: &str) -> Result<TwitchResponse<Channel>, ApiError> {
        self.dispatcher
            .delete(&self.channel_url(name, "/stream_key"), STATUS_OK)
            .await
    }

    /// Starts a commercial. `length` is in seconds (30 to 180 in steps of
    /// 30); `None` lets the server pick its default length.
    pub async fn start_commercial(
        &self,
        name: &str,
        length: Option<u32>,
    ) -> Result<TwitchResponse<Empty>, ApiError> {
        let body = length.map(|l| FormBody::new().field("length", l.to_string()));
        self.dispatcher
            .post(&self.channel_url(name, "/commercial"), body, STATUS_NO_CONTENT)
            .await
    }

    pub async fn teams(&self, name: &str) -> Result<TwitchResponse<Vec<Team>>, ApiError> {
        let response = self
            .dispatcher
            .get::<Value>(&self.channel_url(name, "/teams"), STATUS_OK)
            .await?;
        project(response, "teams")
    }

    pub async fn follows(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
        direction: Direction,
    ) -> Result<TwitchResponse<UserFollows>, ApiError> {
        let query = format!(
            "/follows?limit={}&offset={offset}&direction={direction}",
            clamp_limit(limit)
        );
        self.dispatcher
            .get(&self.channel_url(name, &query), STATUS_OK)
            .await
    }

    pub async fn videos(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
        broadcasts: bool,
        hls: bool,
    ) -> Result<TwitchResponse<Videos>, ApiError> {
        let query = format!(
            "/videos?limit={}&offset={offset}&broadcasts={broadcasts}&hls={hls}",
            clamp_limit(limit)
        );
        self.dispatcher
            .get(&self.channel_url(name, &query), STATUS_OK)
            .await
    }

    pub async fn highlights(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
    ) -> Result<TwitchResponse<Videos>, ApiError> {
        self.videos(name, limit, offset, false, false).await
    }

    pub async fn broadcasts(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
    ) -> Result<TwitchResponse<Videos>, ApiError> {
        self.videos(name, limit, offset, true, false).await
    }

    pub async fn subscriptions(
        &self,
        name: &str,
        limit: u32,
        offset: u32,
        direction: Direction,
    ) -> Result<TwitchResponse<ChannelSubscriptions>, ApiError> {
        let query = format!(
            "/subscriptions?limit={}&offset={offset}&direction={direction}",
            clamp_limit(limit)
        );
        self.dispatcher
            .get(&self.channel_url(name, &query), STATUS_OK)
            .await
    }

    /// First page of subscriptions, oldest first.
    pub async fn first_subscriptions(
        &self,
        name: &str,
    ) -> Result<TwitchResponse<ChannelSubscriptions>, ApiError> {
        self.subscriptions(name, DEFAULT_SUBSCRIPTION_PAGE_SIZE, 0, Direction::Asc)
            .await
    }

    pub async fn subscription(
        &self,
        name: &str,
        user: &str,
    ) -> Result<TwitchResponse<ChannelSubscription>, ApiError> {
        let url = self.channel_url(name, &format!("/subscriptions/{}", segment(user)));
        self.dispatcher.get(&url, STATUS_OK).await
    }
}

/// Pulls the list out of a `{"<field>": [...], "_links": {...}}` document.
fn project<T: serde::de::DeserializeOwned>(
    response: TwitchResponse<Value>,
    field: &str,
) -> Result<TwitchResponse<T>, ApiError> {
    let TwitchResponse {
        status,
        status_text,
        value,
    } = response;
    match project_field(value, field) {
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
