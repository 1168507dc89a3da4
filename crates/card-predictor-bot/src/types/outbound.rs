//! Outbound delivery records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use card_predictor::EngineOutput;

/// What the downstream sender should do with the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundAction {
    /// Post a new prediction.
    Send,
    /// Replace the earlier prediction message for `predicted_round`.
    Edit { predicted_round: u64 },
}

/// One message for the downstream sender to deliver verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub chat_id: i64,
    #[serde(flatten)]
    pub action: OutboundAction,
    pub text: String,
    /// Inbound message that produced this output.
    pub source_message_id: i64,
    pub created_at: DateTime<Utc>,
}

impl OutboundMessage {
    pub fn from_output(chat_id: i64, source_message_id: i64, output: EngineOutput) -> Self {
        let (action, text) = match output {
            EngineOutput::Predicted { text, .. } => (OutboundAction::Send, text),
            EngineOutput::Resolved(update) => (
                OutboundAction::Edit {
                    predicted_round: update.predicted_round,
                },
                update.text,
            ),
        };

        Self {
            chat_id,
            action,
            text,
            source_message_id,
            created_at: Utc::now(),
        }
    }
}
