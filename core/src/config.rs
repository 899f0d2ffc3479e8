//! Client configuration.
//!
//! Values here seed a new client. Every one of them can still be changed on
//! the live client and applies from the next dispatched request on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.twitch.tv/kraken";
pub const DEFAULT_API_VERSION: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: u32,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Whole-request timeout in milliseconds handed to the transport. None
    /// waits forever.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_version() -> u32 {
    DEFAULT_API_VERSION
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            auth_token: None,
            client_id: None,
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_version: u32) -> Self {
        Self {
            base_url: base_url.into(),
            api_version,
            ..Self::default()
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Stored with millisecond precision; anything shorter becomes 1ms.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.timeout_ms = Some(millis.max(1));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Defaults overlaid with `TWITCH_BASE_URL`, `TWITCH_API_VERSION`,
    /// `TWITCH_AUTH_TOKEN`, `TWITCH_CLIENT_ID` and `TWITCH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("TWITCH_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(version) = lookup("TWITCH_API_VERSION") {
            config.api_version = parse_number("TWITCH_API_VERSION", version)?;
        }
        config.auth_token = lookup("TWITCH_AUTH_TOKEN");
        config.client_id = lookup("TWITCH_CLIENT_ID");
        if let Some(timeout) = lookup("TWITCH_TIMEOUT_SECS") {
            let secs: u64 = parse_number("TWITCH_TIMEOUT_SECS", timeout)?;
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_v3() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.twitch.tv/kraken");
        assert_eq!(config.api_version, 3);
        assert!(config.auth_token.is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"client_id":"abc"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.client_id.as_deref(), Some("abc"));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TWITCH_BASE_URL", "http://127.0.0.1:3000/kraken"),
            ("TWITCH_API_VERSION", "5"),
            ("TWITCH_AUTH_TOKEN", "token"),
            ("TWITCH_TIMEOUT_SECS", " 10 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000/kraken");
        assert_eq!(config.api_version, 5);
        assert_eq!(config.auth_token.as_deref(), Some("token"));
        assert!(config.client_id.is_none());
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn env_rejects_bad_version() {
        let err = ClientConfig::from_lookup(lookup(&[("TWITCH_API_VERSION", "three")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "TWITCH_API_VERSION",
                ..
            }
        ));
    }

    #[test]
    fn builders_set_credentials() {
        let config = ClientConfig::new("http://localhost", 3)
            .with_auth_token("t")
            .with_client_id("c")
            .with_timeout(Duration::from_secs(2));
        assert_eq!(config.auth_token.as_deref(), Some("t"));
        assert_eq!(config.client_id.as_deref(), Some("c"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn sub_second_timeout_keeps_its_precision() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout_ms, Some(500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(500)));

        let config = ClientConfig::default().with_timeout(Duration::from_micros(10));
        assert_eq!(config.timeout(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn deserializes_millisecond_timeout() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_ms":250}"#).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
    }
}
