pub mod completions;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;
use super::LlmConfig;
use self::completions::ChatCompletionsClient;
use crate::error::Result;
use crate::models::chat::ChatMessage;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `messages` as one completion request and returns the first
    /// choice's content exactly as the upstream produced it.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> std::result::Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    // Both providers speak the same chat-completions dialect; only the
    // endpoint and default model differ.
    let client: Arc<dyn ChatClient> = Arc::new(ChatCompletionsClient::from_config(config)?);
    Ok(client)
}
