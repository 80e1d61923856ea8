use crate::error::{ RelayError, Result };
use crate::history::{ format_history_for_log, HistoryStore };
use crate::llm::chat::ChatClient;
use crate::llm::DEFAULT_SYSTEM_PROMPT;
use crate::models::chat::ChatMessage;

use log::{ debug, info, log_enabled, warn, Level };
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{ Mutex, OwnedMutexGuard };

/// One async mutex per identity, so a client's turns reach the upstream in
/// the order their questions were recorded.
#[derive(Default)]
struct TurnLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TurnLocks {
    async fn acquire(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop locks nobody holds or waits on; keeps the map from
            // growing with every client ever seen.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks.entry(identity.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Clone)]
pub struct CompletionRelay {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    system_prompt: String,
    turn_locks: Option<Arc<TurnLocks>>,
}

impl CompletionRelay {
    pub fn new(chat_client: Arc<dyn ChatClient>, history_store: Arc<dyn HistoryStore>) -> Self {
        Self {
            chat_client,
            history_store,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            turn_locks: Some(Arc::new(TurnLocks::default())),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// When disabled, concurrent questions from one identity may interleave
    /// their history updates.
    pub fn serialize_turns(mut self, enabled: bool) -> Self {
        self.turn_locks = if enabled { Some(Arc::new(TurnLocks::default())) } else { None };
        self
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history_store
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Records `question` for `identity`, asks the upstream with the whole
    /// conversation and records the trimmed answer.
    ///
    /// On failure the question stays in the history without an answer.
    pub async fn answer(&self, identity: &str, question: Option<&str>) -> Result<String> {
        let question = match question {
            Some(q) if !q.trim().is_empty() => q,
            _ => {
                return Err(RelayError::no_question());
            }
        };

        let _turn = match &self.turn_locks {
            Some(locks) => Some(locks.acquire(identity).await),
            None => None,
        };

        let conversation = self.history_store.append(identity, ChatMessage::user(question)).await;

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend(conversation.messages.iter().cloned());

        if log_enabled!(Level::Debug) {
            debug!("History for {}:\n{}", identity, format_history_for_log(&conversation));
        }

        let raw = self.chat_client.complete(&messages).await?;
        let answer = raw.trim().to_string();

        // The history may have been evicted while the upstream was busy;
        // recreating it would start the log with an orphan answer.
        match self.history_store.append_if_present(identity, ChatMessage::assistant(answer.as_str())).await {
            Some(len) => info!("Answered {} (history now {} messages)", identity, len),
            None => warn!("History for {} was evicted mid-turn; answer not recorded", identity),
        }

        Ok(answer)
    }
}
