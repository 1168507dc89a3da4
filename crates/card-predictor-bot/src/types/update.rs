//! Inbound chat updates, shaped like the chat platform's webhook payloads.

use serde::{Deserialize, Serialize};

/// Kind of chat a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    #[default]
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

impl ChatKind {
    /// Groups, supergroups, and channels carry the card feed.
    pub fn is_shared(self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup | ChatKind::Channel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: ChatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One update as delivered by the chat platform. Exactly one payload field is
/// expected to be set; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<Message>,
}

impl Update {
    /// Flatten into the text and chat metadata the engine needs.
    ///
    /// Returns `None` for updates without a text payload.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let (message, edited) = match (
            self.message,
            self.channel_post,
            self.edited_message,
            self.edited_channel_post,
        ) {
            (Some(m), _, _, _) | (None, Some(m), _, _) => (m, false),
            (None, None, Some(m), _) | (None, None, None, Some(m)) => (m, true),
            (None, None, None, None) => return None,
        };

        let text = message.text?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            chat_kind: message.chat.kind,
            message_id: message.message_id,
            text,
            edited,
        })
    }
}

/// A text message ready to be fed to a chat's engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub message_id: i64,
    pub text: String,
    pub edited: bool,
}
