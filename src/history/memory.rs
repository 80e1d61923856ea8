use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation };

struct Entry {
    conversation: Conversation,
    last_used: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn entry_mut(&mut self, identity: &str, capacity: Option<usize>) -> &mut Entry {
        let now = self.tick();
        if !self.entries.contains_key(identity) {
            if let Some(cap) = capacity {
                while self.entries.len() >= cap {
                    let oldest = self.entries
                        .iter()
                        .min_by_key(|(_, e)| e.last_used)
                        .map(|(id, _)| id.clone());
                    match oldest {
                        Some(id) => {
                            debug!("Evicting conversation history for {}", id);
                            self.entries.remove(&id);
                        }
                        None => break,
                    }
                }
            }
        }
        let entry = self.entries.entry(identity.to_string()).or_insert_with(|| Entry {
            conversation: Conversation::new(identity),
            last_used: now,
        });
        entry.last_used = now;
        entry
    }
}

/// Process-local history keyed by client identity. Nothing is persisted.
///
/// With a capacity, inserting a new identity beyond it evicts the least
/// recently used one. Without, entries live until the store is dropped.
pub struct MemoryHistoryStore {
    inner: RwLock<Inner>,
    capacity: Option<usize>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()), capacity: None }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: Some(capacity.max(1)),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get_or_create(&self, identity: &str) -> Conversation {
        let mut inner = self.inner.write().await;
        inner.entry_mut(identity, self.capacity).conversation.clone()
    }

    async fn append(&self, identity: &str, message: ChatMessage) -> Conversation {
        let mut inner = self.inner.write().await;
        let conversation = &mut inner.entry_mut(identity, self.capacity).conversation;
        conversation.messages.push(message);
        conversation.clone()
    }

    async fn append_if_present(&self, identity: &str, message: ChatMessage) -> Option<usize> {
        let mut inner = self.inner.write().await;
        let now = inner.tick();
        let entry = inner.entries.get_mut(identity)?;
        entry.last_used = now;
        entry.conversation.messages.push(message);
        Some(entry.conversation.messages.len())
    }

    async fn get_conversation(&self, identity: &str) -> Option<Conversation> {
        let inner = self.inner.read().await;
        inner.entries.get(identity).map(|e| e.conversation.clone())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}
