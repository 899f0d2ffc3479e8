//! Default headers applied to every outgoing request.
//!
//! # Design
//! The store is a single `RwLock`-guarded header list owned by the
//! dispatcher. Writers are serialized by the lock and `snapshot` clones the
//! list under a read guard, so a request never observes a half-applied
//! update. A snapshot is taken once per dispatch; later mutations only
//! affect requests dispatched afterwards.

use std::sync::{PoisonError, RwLock};

use crate::http::{find_header, remove_header, set_header};

pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const CLIENT_ID: &str = "Client-ID";

/// Vendor segment of the versioned media type.
pub const API_VENDOR: &str = "twitchtv";

/// `application/vnd.twitchtv.v<N>+json`
pub fn accept_value(api_version: u32) -> String {
    format!("application/vnd.{API_VENDOR}.v{api_version}+json")
}

/// Process-wide default headers for one client.
#[derive(Debug, Default)]
pub struct HeaderStore {
    headers: RwLock<Vec<(String, String)>>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the Accept header for `api_version`.
    pub fn with_api_version(api_version: u32) -> Self {
        let store = Self::new();
        store.set_api_version(api_version);
        store
    }

    /// Sets `name` to `value`, replacing any existing value. Names compare
    /// case-insensitively.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut headers = self.headers.write().unwrap_or_else(PoisonError::into_inner);
        set_header(&mut headers, name.into(), value.into());
    }

    /// Removes `name`. No-op if absent.
    pub fn remove(&self, name: &str) {
        let mut headers = self.headers.write().unwrap_or_else(PoisonError::into_inner);
        remove_header(&mut headers, name);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let headers = self.headers.read().unwrap_or_else(PoisonError::into_inner);
        find_header(&headers, name).map(str::to_string)
    }

    /// The header set to attach to the next dispatched request.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_api_version(&self, api_version: u32) {
        self.set(ACCEPT, accept_value(api_version));
    }

    /// `Authorization: OAuth <token>`. A missing or blank token removes the
    /// header instead of sending it empty.
    pub fn set_auth_token(&self, token: Option<&str>) {
        match non_blank(token) {
            Some(token) => self.set(AUTHORIZATION, format!("OAuth {token}")),
            None => self.remove(AUTHORIZATION),
        }
    }

    /// `Client-ID: <id>`. A missing or blank id removes the header.
    pub fn set_client_id(&self, client_id: Option<&str>) {
        match non_blank(client_id) {
            Some(id) => self.set(CLIENT_ID, id),
            None => self.remove(CLIENT_ID),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn api_version_sets_vendor_accept_header() {
        let store = HeaderStore::with_api_version(3);
        assert_eq!(
            store.get("accept").as_deref(),
            Some("application/vnd.twitchtv.v3+json")
        );
        store.set_api_version(5);
        assert_eq!(
            store.snapshot(),
            vec![(
                "Accept".to_string(),
                "application/vnd.twitchtv.v5+json".to_string()
            )]
        );
    }

    #[test]
    fn set_overwrites_existing_value() {
        let store = HeaderStore::new();
        store.set("X-Trace", "one");
        store.set("x-trace", "two");
        assert_eq!(
            store.snapshot(),
            vec![("X-Trace".to_string(), "two".to_string())]
        );
    }

    #[test]
    fn setting_twice_matches_setting_once() {
        let once = HeaderStore::with_api_version(3);
        once.set_auth_token(Some("abc"));
        let twice = HeaderStore::with_api_version(3);
        twice.set_auth_token(Some("abc"));
        twice.set_auth_token(Some("abc"));
        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn remove_after_set_matches_never_set() {
        let store = HeaderStore::with_api_version(3);
        let pristine = store.snapshot();
        store.set_client_id(Some("client"));
        store.remove(CLIENT_ID);
        assert_eq!(store.snapshot(), pristine);
        store.remove(CLIENT_ID);
        assert_eq!(store.snapshot(), pristine);
    }

    #[test]
    fn auth_token_is_sent_with_oauth_prefix() {
        let store = HeaderStore::new();
        store.set_auth_token(Some("s3cret"));
        assert_eq!(store.get(AUTHORIZATION).as_deref(), Some("OAuth s3cret"));
    }

    #[test]
    fn empty_or_blank_credentials_remove_the_header() {
        let store = HeaderStore::new();
        store.set_auth_token(Some("s3cret"));
        store.set_client_id(Some("client"));

        store.set_auth_token(Some(""));
        store.set_client_id(Some("   "));
        assert!(store.get(AUTHORIZATION).is_none());
        assert!(store.get(CLIENT_ID).is_none());

        store.set_auth_token(Some("again"));
        store.set_auth_token(None);
        assert!(store.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn snapshot_is_detached_from_later_mutations() {
        let store = HeaderStore::new();
        store.set_client_id(Some("before"));
        let snapshot = store.snapshot();
        store.set_client_id(Some("after"));
        assert_eq!(
            snapshot,
            vec![("Client-ID".to_string(), "before".to_string())]
        );
    }

    #[test]
    fn concurrent_writers_never_tear_a_snapshot() {
        let store = Arc::new(HeaderStore::new());
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..200 {
                        store.set("X-Writer", format!("{i}-{n}"));
                        store.set_client_id(Some(&format!("id-{i}")));
                    }
                })
            })
            .collect();
        for _ in 0..200 {
            let snapshot = store.snapshot();
            let writer_headers = snapshot
                .iter()
                .filter(|(n, _)| n.eq_ignore_ascii_case("x-writer"))
                .count();
            assert!(writer_headers <= 1);
        }
        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(store.snapshot().len(), 2);
    }
}
