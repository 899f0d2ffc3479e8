//! `/games` endpoints.

use crate::channels::clamp_limit;
use crate::dispatch::{Dispatcher, TwitchResponse, STATUS_OK};
use crate::error::ApiError;
use crate::types::TopGames;

#[derive(Debug, Clone, Copy)]
pub struct Games<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> Games<'a> {
    pub fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Games sorted by current viewers, most watched first.
    pub async fn top(&self, limit: u32, offset: u32) -> Result<TwitchResponse<TopGames>, ApiError> {
        let url = self.dispatcher.url(&format!(
            "/games/top?limit={}&offset={offset}",
            clamp_limit(limit)
        ));
        self.dispatcher.get(&url, STATUS_OK).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderStore;
    use crate::testing::StubTransport;

    #[tokio::test]
    async fn top_decodes_total_and_entries() {
        let stub = StubTransport::new();
        stub.push_json(
            200,
            r#"{"_total":2,"_links":{},"top":[
                {"game":{"_id":1,"name":"Chess","giantbomb_id":9},"viewers":120,"channels":4},
                {"game":{"_id":2,"name":"Go"},"viewers":30,"channels":1}
            ]}"#,
        );
        let d = Dispatcher::new(
            "http://localhost:3000/kraken",
            HeaderStore::with_api_version(3),
            stub.clone(),
        );

        let top = Games::new(&d).top(250, 0).await.unwrap().value;
        assert_eq!(top.total, 2);
        assert_eq!(top.top[0].game.name, "Chess");
        assert_eq!(top.top[0].viewers, 120);
        assert_eq!(top.top[1].game.giantbomb_id, None);
        assert_eq!(
            stub.requests()[0].url,
            "http://localhost:3000/kraken/games/top?limit=100&offset=0"
        );
    }
}
