//! Chat registry. Lazily creates one session per chat.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use card_predictor::PredictorConfig;

use super::ChatSession;
use crate::types::BotResult;

/// Registry of per-chat sessions. Chats never share engine state.
pub struct ChatRegistry {
    config: PredictorConfig,
    sessions: HashMap<i64, Arc<Mutex<ChatSession>>>,
}

impl ChatRegistry {
    /// Create an empty registry; every new session uses `config`.
    pub fn new(config: PredictorConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Get or create the session for the given chat.
    pub fn get_or_create(&mut self, chat_id: i64) -> BotResult<Arc<Mutex<ChatSession>>> {
        if let Some(session) = self.sessions.get(&chat_id) {
            return Ok(session.clone());
        }

        let session = Arc::new(Mutex::new(ChatSession::open(chat_id, &self.config)?));
        self.sessions.insert(chat_id, session.clone());
        Ok(session)
    }

    /// Look up an existing session without creating one.
    pub fn get(&self, chat_id: i64) -> Option<Arc<Mutex<ChatSession>>> {
        self.sessions.get(&chat_id).cloned()
    }

    /// Discard a chat's session and its engine state.
    pub fn retire(&mut self, chat_id: i64) -> bool {
        let removed = self.sessions.remove(&chat_id).is_some();
        if removed {
            tracing::info!("Retired session for chat {chat_id}");
        }
        removed
    }

    /// Number of active chat sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn chat_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
