//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

struct Scripted {
    outcome: Result<HttpResponse, TransportError>,
    delay: Option<Duration>,
}

/// Answers requests with queued outcomes, in dispatch order, and records
/// every request it receives.
#[derive(Default)]
pub(crate) struct StubTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    completed: Mutex<Vec<String>>,
}

impl StubTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, outcome: Result<HttpResponse, TransportError>) {
        self.script.lock().unwrap().push_back(Scripted {
            outcome,
            delay: None,
        });
    }

    /// Queues a response whose status text is the canonical reason phrase.
    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.push(Ok(response(status, body)));
    }

    pub(crate) fn push_json_delayed(&self, status: u16, body: &str, delay: Duration) {
        self.script.lock().unwrap().push_back(Scripted {
            outcome: Ok(response(status, body)),
            delay: Some(delay),
        });
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// URLs in the order their responses were delivered.
    pub(crate) fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    let status_text = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default();
    HttpResponse::new(status, status_text, body.to_string())
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        let scripted = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left");
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(url);
        scripted.outcome
    }
}
