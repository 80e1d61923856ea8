use async_trait::async_trait;
use log::{ debug, error, warn };
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use std::error::Error as StdError;

use super::ChatClient;
use crate::error::{ RelayError, Result, UNKNOWN_UPSTREAM_ERROR };
use crate::llm::LlmConfig;
use crate::models::chat::{ ChatMessage, Role };

/// Client for OpenAI-compatible `chat/completions` endpoints (Groq, OpenAI).
pub struct ChatCompletionsClient {
    http: HttpClient,
    model: String,
    endpoint: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self { role: msg.role, content: msg.content.clone() }
    }
}

#[derive(Serialize, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: &str,
        model: String,
        endpoint: String,
        config: &LlmConfig
    ) -> std::result::Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
            format!("Invalid API key format: {}", e)
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = HttpClient::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self { http, model, endpoint })
    }

    pub fn from_config(config: &LlmConfig) -> std::result::Result<Self, Box<dyn StdError + Send + Sync>> {
        // A missing key is not fatal: the upstream rejects the call and the
        // rejection reaches the client as an upstream error.
        let api_key = config.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("No API key configured for {}; upstream calls will be unauthenticated.", config.llm_type);
        }
        Self::new(&api_key, config.model(), config.endpoint(), config)
    }

    pub fn build_request(&self, messages: &[ChatMessage]) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
        }
    }
}

/// Renders an error with its source chain, so transport failures keep the
/// underlying cause (e.g. "Connection refused") in the message.
pub fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

fn upstream_error_message(body: &JsonValue) -> String {
    match body.get("error") {
        Some(JsonValue::Object(obj)) =>
            obj
                .get("message")
                .and_then(JsonValue::as_str)
                .unwrap_or(UNKNOWN_UPSTREAM_ERROR)
                .to_string(),
        Some(JsonValue::String(msg)) => msg.clone(),
        _ => UNKNOWN_UPSTREAM_ERROR.to_string(),
    }
}

/// Extracts `choices[0].message.content` from a parsed completion body.
pub fn parse_completion(status: StatusCode, body: &JsonValue) -> Result<String> {
    let content = if status.is_success() {
        body.pointer("/choices/0/message/content").and_then(JsonValue::as_str)
    } else {
        None
    };

    match content {
        Some(content) => Ok(content.to_string()),
        None => Err(RelayError::Upstream(upstream_error_message(body))),
    }
}

#[async_trait]
impl ChatClient for ChatCompletionsClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let req = self.build_request(messages);
        debug!("Sending {} messages to {} (model {})", req.messages.len(), self.endpoint, self.model);

        let resp = self.http
            .post(&self.endpoint)
            .json(&req)
            .send().await
            .map_err(|e| {
                error!("Upstream request to {} failed: {}", self.endpoint, describe_error(&e));
                RelayError::server(describe_error(&e))
            })?;

        let status = resp.status();
        let body = resp.json::<JsonValue>().await.map_err(|e| {
            error!("Upstream returned an unreadable body (status {}): {}", status, describe_error(&e));
            RelayError::server(describe_error(&e))
        })?;

        parse_completion(status, &body).map_err(|e| {
            warn!("Upstream rejected completion (status {}): {}", status, e);
            e
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.endpoint.clone())
    }
}
