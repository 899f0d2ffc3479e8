//! Resource models of the REST API.
//!
//! # Design
//! Only `Deserialize` is derived for response models; they are never sent.
//! Every optional wire field carries `#[serde(default)]` so a sparse payload
//! still decodes, while required fields stay strict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::FormBody;

/// Value of a successful response that intentionally has no body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub delay: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mature: Option<bool>,
    #[serde(default)]
    pub partner: bool,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Only present when the authenticated user owns the channel.
    #[serde(default)]
    pub stream_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Follow {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub notifications: bool,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserFollows {
    #[serde(rename = "_total", default)]
    pub total: u64,
    #[serde(default)]
    pub follows: Vec<Follow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub broadcast_id: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelSubscription {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelSubscriptions {
    #[serde(rename = "_total", default)]
    pub total: u64,
    #[serde(default)]
    pub subscriptions: Vec<ChannelSubscription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub giantbomb_id: Option<u64>,
    #[serde(default)]
    pub popularity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopGame {
    pub game: Game,
    #[serde(default)]
    pub viewers: u64,
    #[serde(default)]
    pub channels: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopGames {
    #[serde(rename = "_total", default)]
    pub total: u64,
    #[serde(default)]
    pub top: Vec<TopGame>,
}

/// Changes applied by `PUT /channels/{name}`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelUpdate {
    pub status: Option<String>,
    pub game: Option<String>,
    pub delay: Option<u32>,
}

impl ChannelUpdate {
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn to_form(&self) -> FormBody {
        let mut form = FormBody::new();
        if let Some(status) = &self.status {
            form.set("channel[status]", status.as_str());
        }
        if let Some(game) = &self.game {
            form.set("channel[game]", game.as_str());
        }
        if let Some(delay) = self.delay {
            form.set("channel[delay]", delay.to_string());
        }
        form
    }
}

/// Sort order for paged listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}
