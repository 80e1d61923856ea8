mod memory;

use async_trait::async_trait;
use log::{ info, warn };
use std::sync::Arc;
use crate::cli::Args;
use crate::models::chat::{ ChatMessage, Conversation };

pub use memory::MemoryHistoryStore;

/// Per-client conversation log. Operations never fail: the store is the
/// in-process source of truth for every identity it has seen.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the conversation for `identity`, creating an empty one if absent.
    async fn get_or_create(&self, identity: &str) -> Conversation;

    /// Appends `message` to the end of the conversation for `identity` and
    /// returns the conversation as it stands afterwards.
    async fn append(&self, identity: &str, message: ChatMessage) -> Conversation;

    /// Appends only if `identity` still has a conversation (it may have been
    /// evicted meanwhile). Returns the new message count.
    async fn append_if_present(&self, identity: &str, message: ChatMessage) -> Option<usize>;

    /// Lookup without creating an entry.
    async fn get_conversation(&self, identity: &str) -> Option<Conversation>;

    /// Number of identities currently tracked.
    async fn len(&self) -> usize;
}

pub fn create_history_store(args: &Args) -> Arc<dyn HistoryStore> {
    let store = match args.history_max_conversations {
        0 => {
            warn!(
                "Conversation history is unbounded; memory grows with every distinct client for the lifetime of the process."
            );
            MemoryHistoryStore::new()
        }
        cap => {
            info!("Conversation history capped at {} clients (least recently used evicted)", cap);
            MemoryHistoryStore::with_capacity(cap)
        }
    };
    Arc::new(store)
}

pub fn format_history_for_log(conversation: &Conversation) -> String {
    if conversation.messages.is_empty() {
        return String::from("(empty)");
    }
    let mut result = String::new();
    for msg in &conversation.messages {
        let role_display = match msg.role.as_str() {
            "user" => "User",
            "assistant" => "Assistant",
            other => other,
        };
        result.push_str(&format!("{}: {}\n", role_display, msg.content));
    }

    result
}
