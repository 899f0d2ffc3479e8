use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::FormRejection, Form, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Accept header every request must carry.
pub const API_ACCEPT: &str = "application/vnd.twitchtv.v3+json";
/// Token owning the seeded `foo` channel.
pub const OWNER_TOKEN: &str = "foo-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub status: Option<String>,
    pub game: Option<String>,
    pub delay: u32,
    pub followers: u64,
    pub views: u64,
    pub partner: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_key: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: u64,
    pub name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Follow {
    pub created_at: String,
    pub notifications: bool,
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub broadcast: bool,
    pub length: u64,
    pub views: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: String,
    pub user: User,
}

#[derive(Clone, Debug)]
pub struct ChannelRecord {
    pub channel: Channel,
    pub stream_key: String,
    pub editors: Vec<User>,
    pub teams: Vec<Team>,
    pub follows: Vec<Follow>,
    pub videos: Vec<Video>,
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub channels: HashMap<String, ChannelRecord>,
    /// OAuth token -> owned channel name.
    pub tokens: HashMap<String, String>,
}

pub type Db = Arc<RwLock<MockState>>;

#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub direction: Option<String>,
}

#[derive(Deserialize)]
pub struct VideoParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub broadcasts: Option<bool>,
}

type ApiResult<T> = Result<T, Response>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    let api = Router::new()
        .route("/channel", get(get_own_channel))
        .route("/channels/{name}", get(get_channel).put(update_channel))
        .route("/channels/{name}/editors", get(get_editors))
        .route("/channels/{name}/teams", get(get_teams))
        .route("/channels/{name}/follows", get(get_follows))
        .route("/channels/{name}/videos", get(get_videos))
        .route("/channels/{name}/subscriptions", get(get_subscriptions))
        .route("/channels/{name}/subscriptions/{user}", get(get_subscription))
        .route("/channels/{name}/commercial", post(start_commercial))
        .route("/channels/{name}/stream_key", delete(reset_stream_key))
        .route("/games/top", get(top_games))
        .route_layer(middleware::from_fn(require_api_version))
        .with_state(db);
    Router::new().nest("/kraken", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn user(id: u64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        display_name: name.to_uppercase(),
        kind: "user".to_string(),
    }
}

fn channel(id: u64, name: &str, status: Option<&str>, game: Option<&str>) -> Channel {
    Channel {
        id,
        name: name.to_string(),
        display_name: name.to_uppercase(),
        status: status.map(str::to_string),
        game: game.map(str::to_string),
        delay: 0,
        followers: 0,
        views: 0,
        partner: false,
        url: format!("http://www.twitch.tv/{name}"),
        stream_key: None,
    }
}

fn seed() -> MockState {
    let follows: Vec<Follow> = (0..5)
        .map(|n| Follow {
            created_at: format!("2015-01-0{}T00:00:00Z", n + 1),
            notifications: n % 2 == 0,
            user: user(100 + n, &format!("viewer{n}")),
        })
        .collect();

    let mut foo = channel(12, "foo", Some("Playing chess"), Some("Chess"));
    foo.followers = follows.len() as u64;
    foo.views = 1000;
    foo.partner = true;

    let foo = ChannelRecord {
        channel: foo,
        stream_key: "live_12_initial".to_string(),
        editors: vec![user(1, "amy")],
        teams: vec![Team {
            id: 3,
            name: "staff".to_string(),
            display_name: "Staff".to_string(),
        }],
        follows,
        videos: vec![
            Video {
                id: "v1".to_string(),
                title: "Best moves".to_string(),
                broadcast: false,
                length: 120,
                views: 50,
            },
            Video {
                id: "v2".to_string(),
                title: "Full stream".to_string(),
                broadcast: true,
                length: 7200,
                views: 300,
            },
        ],
        subscriptions: vec![
            Subscription {
                id: "sub-1".to_string(),
                created_at: "2015-02-01T00:00:00Z".to_string(),
                user: user(1, "amy"),
            },
            Subscription {
                id: "sub-2".to_string(),
                created_at: "2015-03-01T00:00:00Z".to_string(),
                user: user(2, "bob"),
            },
        ],
    };
    let bar = ChannelRecord {
        channel: channel(34, "bar", None, None),
        stream_key: "live_34_initial".to_string(),
        editors: Vec::new(),
        teams: Vec::new(),
        follows: Vec::new(),
        videos: Vec::new(),
        subscriptions: Vec::new(),
    };

    MockState {
        channels: HashMap::from([("foo".to_string(), foo), ("bar".to_string(), bar)]),
        tokens: HashMap::from([(OWNER_TOKEN.to_string(), "foo".to_string())]),
    }
}

/// Twitch-style error body.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({
        "error": status.canonical_reason().unwrap_or_default(),
        "status": status.as_u16(),
        "message": message.into(),
    });
    (status, Json(body)).into_response()
}

async fn require_api_version(request: Request, next: Next) -> Response {
    let accept = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok());
    if accept != Some(API_ACCEPT) {
        return api_error(StatusCode::BAD_REQUEST, "unsupported API version");
    }
    next.run(request).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("OAuth "))
}

fn unauthorized() -> Response {
    api_error(
        StatusCode::UNAUTHORIZED,
        "Token invalid or missing required scope",
    )
}

/// Name of the channel the request's token owns.
fn owner<'a>(headers: &HeaderMap, state: &'a MockState) -> ApiResult<&'a str> {
    bearer(headers)
        .and_then(|token| state.tokens.get(token))
        .map(String::as_str)
        .ok_or_else(unauthorized)
}

fn require_owner(headers: &HeaderMap, state: &MockState, name: &str) -> ApiResult<()> {
    if owner(headers, state)? == name {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

fn record<'a>(state: &'a MockState, name: &str) -> ApiResult<&'a ChannelRecord> {
    state.channels.get(name).ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Channel '{name}' does not exist"),
        )
    })
}

fn page<T: Clone>(items: &[T], limit: Option<usize>, offset: Option<usize>) -> Vec<T> {
    items
        .iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(25).clamp(1, 100))
        .cloned()
        .collect()
}

async fn get_channel(State(db): State<Db>, Path(name): Path<String>) -> ApiResult<Json<Channel>> {
    let state = db.read().await;
    Ok(Json(record(&state, &name)?.channel.clone()))
}

async fn get_own_channel(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<Channel>> {
    let state = db.read().await;
    let name = owner(&headers, &state)?;
    let record = record(&state, name)?;
    let mut channel = record.channel.clone();
    channel.stream_key = Some(record.stream_key.clone());
    Ok(Json(channel))
}

async fn update_channel(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> ApiResult<Json<Channel>> {
    let mut state = db.write().await;
    record(&state, &name)?;
    require_owner(&headers, &state, &name)?;

    let delay = match fields.get("channel[delay]") {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| api_error(StatusCode::BAD_REQUEST, "invalid delay"))?,
        ),
        None => None,
    };
    let Some(record) = state.channels.get_mut(&name) else {
        return Err(StatusCode::NOT_FOUND.into_response());
    };
    if let Some(status) = fields.get("channel[status]") {
        record.channel.status = Some(status.clone());
    }
    if let Some(game) = fields.get("channel[game]") {
        record.channel.game = Some(game.clone());
    }
    if let Some(delay) = delay {
        record.channel.delay = delay;
    }
    Ok(Json(record.channel.clone()))
}

async fn get_editors(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    require_owner(&headers, &state, &name)?;
    Ok(Json(json!({
        "_links": { "self": format!("/kraken/channels/{name}/editors") },
        "users": record.editors,
    })))
}

async fn get_teams(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    Ok(Json(json!({
        "_links": { "self": format!("/kraken/channels/{name}/teams") },
        "teams": record.teams,
    })))
}

async fn get_follows(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    let mut follows = record.follows.clone();
    if params.direction.as_deref() == Some("desc") {
        follows.reverse();
    }
    Ok(Json(json!({
        "_total": record.follows.len(),
        "follows": page(&follows, params.limit, params.offset),
    })))
}

async fn get_videos(
    State(db): State<Db>,
    Path(name): Path<String>,
    Query(params): Query<VideoParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    let broadcasts = params.broadcasts.unwrap_or(false);
    let videos: Vec<Video> = record
        .videos
        .iter()
        .filter(|v| v.broadcast == broadcasts)
        .cloned()
        .collect();
    Ok(Json(json!({
        "videos": page(&videos, params.limit, params.offset),
    })))
}

async fn get_subscriptions(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    require_owner(&headers, &state, &name)?;
    let mut subscriptions = record.subscriptions.clone();
    if params.direction.as_deref() == Some("desc") {
        subscriptions.reverse();
    }
    Ok(Json(json!({
        "_total": record.subscriptions.len(),
        "subscriptions": page(&subscriptions, params.limit, params.offset),
    })))
}

async fn get_subscription(
    State(db): State<Db>,
    Path((name, user)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<Subscription>> {
    let state = db.read().await;
    let record = record(&state, &name)?;
    require_owner(&headers, &state, &name)?;
    record
        .subscriptions
        .iter()
        .find(|s| s.user.name == user)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("{user} has no subscriptions to {name}"),
            )
        })
}

async fn start_commercial(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> ApiResult<StatusCode> {
    let state = db.read().await;
    record(&state, &name)?;
    require_owner(&headers, &state, &name)?;

    let length = match form.ok().and_then(|Form(fields)| fields.get("length").cloned()) {
        Some(raw) => raw.parse::<u32>().ok(),
        None => Some(30),
    };
    match length {
        Some(l) if (30..=180).contains(&l) && l % 30 == 0 => Ok(StatusCode::NO_CONTENT),
        _ => Err(api_error(StatusCode::BAD_REQUEST, "invalid length")),
    }
}

async fn reset_stream_key(
    State(db): State<Db>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Channel>> {
    let mut state = db.write().await;
    record(&state, &name)?;
    require_owner(&headers, &state, &name)?;
    let Some(record) = state.channels.get_mut(&name) else {
        return Err(StatusCode::NOT_FOUND.into_response());
    };
    record.stream_key = format!("live_{}_{}", record.channel.id, Uuid::new_v4().simple());
    let mut channel = record.channel.clone();
    channel.stream_key = Some(record.stream_key.clone());
    Ok(Json(channel))
}

async fn top_games(Query(params): Query<PageParams>) -> Json<serde_json::Value> {
    let games = [("Chess", 1, 1200, 40), ("Go", 2, 300, 12), ("Shogi", 3, 50, 2)];
    let top: Vec<serde_json::Value> = games
        .iter()
        .map(|(name, id, viewers, channels)| {
            json!({
                "game": { "_id": id, "name": name, "popularity": viewers },
                "viewers": viewers,
                "channels": channels,
            })
        })
        .collect();
    Json(json!({
        "_total": top.len(),
        "top": page(&top, params.limit, params.offset),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_serializes_wire_names() {
        let json = serde_json::to_value(channel(7, "baz", Some("s"), None)).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["display_name"], "BAZ");
        assert!(json["game"].is_null());
        assert!(json.get("stream_key").is_none());
    }

    #[test]
    fn user_kind_serializes_as_type() {
        let json = serde_json::to_value(user(1, "amy")).unwrap();
        assert_eq!(json["type"], "user");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn page_applies_offset_and_clamped_limit() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(page(&items, Some(3), Some(2)), vec![2, 3, 4]);
        assert_eq!(page(&items, Some(0), None), vec![0]);
        assert_eq!(page(&items, None, Some(9)), vec![9]);
    }

    #[test]
    fn seed_owner_token_maps_to_foo() {
        let state = seed();
        assert_eq!(state.tokens.get(OWNER_TOKEN).map(String::as_str), Some("foo"));
        assert_eq!(state.channels["foo"].channel.followers, 5);
    }

    #[test]
    fn api_error_carries_reason_and_message() {
        let response = api_error(StatusCode::NOT_FOUND, "gone");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
