#![allow(dead_code)]

use ask_relay::history::{ HistoryStore, MemoryHistoryStore };
use ask_relay::llm::chat::new_client;
use ask_relay::llm::LlmConfig;
use ask_relay::relay::CompletionRelay;
use serde_json::{ json, Value };
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{ header, method, path };
use wiremock::{ Mock, MockServer, Request, Respond, ResponseTemplate };

pub const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";
pub const TEST_KEY: &str = "test-api-key";

/// Stand-in for the upstream chat-completions endpoint.
pub struct UpstreamMock {
    pub server: MockServer,
}

impl UpstreamMock {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.uri(), COMPLETIONS_PATH)
    }

    pub fn relay(&self) -> (CompletionRelay, Arc<MemoryHistoryStore>) {
        relay_for(&self.endpoint())
    }

    /// Every request gets `content` as the first choice.
    pub async fn reply_with(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .and(header("authorization", format!("Bearer {}", TEST_KEY).as_str()))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&self.server).await;
    }

    /// Like `reply_with`, but holds every response for `delay`.
    pub async fn reply_after(&self, content: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)).set_delay(delay))
            .mount(&self.server).await;
    }

    /// Answers with the number of messages the request carried, so tests can
    /// tell turns apart.
    pub async fn reply_with_message_count(&self) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(CountingResponder)
            .mount(&self.server).await;
    }

    pub async fn fail_with(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server).await;
    }

    pub async fn reply_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server).await;
    }

    /// Bodies of every request the upstream has seen, in arrival order.
    pub async fn payloads(&self) -> Vec<Value> {
        self.server
            .received_requests().await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).expect("request body is JSON"))
            .collect()
    }
}

struct CountingResponder;

impl Respond for CountingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
        ResponseTemplate::new(200).set_body_json(completion_body(&format!(" answer {} ", count)))
    }
}

pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "llama-3.1-8b-instant",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

pub fn relay_for(endpoint: &str) -> (CompletionRelay, Arc<MemoryHistoryStore>) {
    relay_with_store(endpoint, MemoryHistoryStore::new())
}

pub fn relay_with_store(
    endpoint: &str,
    store: MemoryHistoryStore
) -> (CompletionRelay, Arc<MemoryHistoryStore>) {
    let config = LlmConfig {
        api_key: Some(TEST_KEY.to_string()),
        base_url: Some(endpoint.to_string()),
        ..LlmConfig::default()
    };
    let client = new_client(&config).expect("client builds");
    let store = Arc::new(store);
    let history: Arc<dyn HistoryStore> = store.clone();
    (CompletionRelay::new(client, history), store)
}
