//! Update dispatcher. Routes chat updates to the right chat session.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::BotSettings;
use crate::session::{ChatRegistry, SessionReport};
use crate::types::*;

/// Receives chat updates, filters them, and hands them to per-chat engines.
pub struct UpdateHandler {
    settings: BotSettings,
    registry: Arc<Mutex<ChatRegistry>>,
}

impl UpdateHandler {
    pub fn new(settings: BotSettings) -> BotResult<Self> {
        settings.predictor.validate()?;
        let registry = ChatRegistry::new(settings.predictor.clone());
        Ok(Self {
            settings,
            registry: Arc::new(Mutex::new(registry)),
        })
    }

    pub fn registry(&self) -> Arc<Mutex<ChatRegistry>> {
        self.registry.clone()
    }

    /// Handle one update. Updates without text produce nothing.
    pub async fn handle_update(&self, update: Update) -> BotResult<Option<OutboundMessage>> {
        let update_id = update.update_id;
        match update.into_inbound() {
            Some(inbound) => self.handle_inbound(inbound).await,
            None => {
                tracing::debug!("Update {update_id:?} carries no text, skipping");
                Ok(None)
            }
        }
    }

    /// Handle one text message.
    ///
    /// The chat's session stays locked for the whole engine call, so each
    /// message is applied atomically.
    pub async fn handle_inbound(&self, inbound: InboundMessage) -> BotResult<Option<OutboundMessage>> {
        if !inbound.chat_kind.is_shared() && !self.settings.include_private {
            tracing::debug!("Ignoring {:?} chat {}", inbound.chat_kind, inbound.chat_id);
            return Ok(None);
        }

        if inbound.edited && !self.settings.process_edits {
            tracing::debug!("Ignoring edited message in chat {}", inbound.chat_id);
            return Ok(None);
        }

        let session = {
            let mut registry = self.registry.lock().await;
            registry.get_or_create(inbound.chat_id)?
        };

        let mut session = session.lock().await;
        let outbound = session.handle(&inbound);
        if let Some(out) = &outbound {
            tracing::info!("Chat {}: {:?} -> {}", out.chat_id, out.action, out.text);
        }
        Ok(outbound)
    }

    /// Drop a chat's engine state.
    pub async fn retire_chat(&self, chat_id: i64) -> bool {
        self.registry.lock().await.retire(chat_id)
    }

    /// Number of chats with a live session.
    pub async fn chat_count(&self) -> usize {
        self.registry.lock().await.count()
    }

    /// Activity reports for every live session, ordered by chat id.
    pub async fn session_reports(&self) -> Vec<SessionReport> {
        let sessions: Vec<_> = {
            let registry = self.registry.lock().await;
            registry
                .chat_ids()
                .into_iter()
                .filter_map(|chat_id| registry.get(chat_id))
                .collect()
        };

        let mut reports = Vec::with_capacity(sessions.len());
        for session in sessions {
            reports.push(session.lock().await.report());
        }
        reports
    }
}
