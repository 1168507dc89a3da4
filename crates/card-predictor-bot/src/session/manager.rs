//! Per-chat session: one prediction engine and its activity counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use card_predictor::{CardPredictor, PredictorConfig, PredictorStats};

use crate::types::{BotResult, InboundMessage, OutboundMessage};

/// Activity snapshot of one chat session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub chat_id: i64,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub messages_seen: u64,
    pub outputs_sent: u64,
    pub stats: PredictorStats,
}

/// Owns the prediction engine for a single chat.
pub struct ChatSession {
    chat_id: i64,
    predictor: CardPredictor,
    started_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    messages_seen: u64,
    outputs_sent: u64,
}

impl ChatSession {
    /// Start a session for `chat_id` with a fresh engine.
    pub fn open(chat_id: i64, config: &PredictorConfig) -> BotResult<Self> {
        let predictor = CardPredictor::new(config.clone())?;
        let now = Utc::now();

        tracing::info!("Session started for chat {chat_id}");

        Ok(Self {
            chat_id,
            predictor,
            started_at: now,
            last_activity: now,
            messages_seen: 0,
            outputs_sent: 0,
        })
    }

    /// Feed one message to the engine and wrap its output for delivery.
    pub fn handle(&mut self, inbound: &InboundMessage) -> Option<OutboundMessage> {
        self.messages_seen += 1;
        self.last_activity = Utc::now();

        if inbound.edited {
            tracing::debug!("Chat {}: edited message {}", self.chat_id, inbound.message_id);
        }

        let output = self.predictor.process(&inbound.text)?;
        self.outputs_sent += 1;
        Some(OutboundMessage::from_output(
            self.chat_id,
            inbound.message_id,
            output,
        ))
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            chat_id: self.chat_id,
            started_at: self.started_at,
            last_activity: self.last_activity,
            messages_seen: self.messages_seen,
            outputs_sent: self.outputs_sent,
            stats: self.predictor.stats(),
        }
    }

    pub fn predictor(&self) -> &CardPredictor {
        &self.predictor
    }

    pub fn messages_seen(&self) -> u64 {
        self.messages_seen
    }

    pub fn outputs_sent(&self) -> u64 {
        self.outputs_sent
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        let stats = self.predictor.stats();
        tracing::debug!(
            "Session for chat {} closed after {} messages: {} pending, {} correct, {} failed",
            self.chat_id,
            self.messages_seen,
            stats.pending,
            stats.correct,
            stats.failed
        );
    }
}
