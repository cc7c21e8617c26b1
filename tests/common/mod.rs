#![allow(dead_code)]
//! Shared helpers for kiln-link integration tests.
//!
//! The tests run fully in-process: [`MockTransport`] replaces the HTTP layer
//! via `KilnLinkClientBuilder::transport`, so the whole client stack (cache,
//! query runner, mutations, watches) is exercised against scripted responses
//! without a server.

use async_trait::async_trait;
use kiln_link::{ApiRequest, ApiTransport, KilnLinkClient, KilnLinkError, Result};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted transport keyed by `"METHOD path"` signatures.
///
/// Each signature holds a queue of responses. A request pops the front of
/// its queue; once the queue is down to one entry that response sticks, so
/// a polled endpoint keeps receiving the last script. Every request is
/// recorded for assertions.
pub struct MockTransport {
    scripts: Mutex<HashMap<String, Vec<Result<JsonValue>>>>,
    recorded: Mutex<Vec<ApiRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            recorded: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        })
    }

    /// Delay every response, so concurrent requests overlap deterministically.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Append a response to the queue for `signature`, e.g. `"GET /training-jobs"`.
    pub fn respond(&self, signature: &str, response: Result<JsonValue>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(signature.to_string())
            .or_default()
            .push(response);
    }

    /// Number of recorded requests matching `signature`.
    pub fn call_count(&self, signature: &str) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request_signature(request) == signature)
            .count()
    }

    /// All recorded requests in arrival order.
    pub fn recorded(&self) -> Vec<ApiRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue> {
        let signature = request_signature(&request);
        self.recorded.lock().unwrap().push(request);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&signature) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => Err(KilnLinkError::InternalError(format!(
                "No scripted response for {}",
                signature
            ))),
        }
    }
}

pub fn request_signature(request: &ApiRequest) -> String {
    format!("{} {}", request.method, request.path)
}

/// Build a client wired to the given transport.
pub fn client_with(transport: Arc<MockTransport>) -> KilnLinkClient {
    KilnLinkClient::builder()
        .base_url("http://localhost:8000")
        .transport(transport as Arc<dyn ApiTransport>)
        .build()
        .expect("test client should build")
}

/// Minimal job payload as the server would return it.
pub fn job_json(id: i64, status: &str) -> JsonValue {
    json!({
        "id": id,
        "name": format!("job-{}", id),
        "base_model": "llama-3-8b",
        "status": status,
    })
}

/// Log window payload for a job.
pub fn logs_json(job_id: i64, messages: &[&str]) -> JsonValue {
    json!({
        "job_id": job_id,
        "lines": messages
            .iter()
            .map(|message| json!({ "message": message }))
            .collect::<Vec<_>>(),
    })
}
