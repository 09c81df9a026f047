use crate::api::schemas::users::UserSchema;
use crate::domain::message::{MessageDraft, MessageType, PopulatedMessage};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub sender_id: Option<Uuid>,
    pub message_type: Option<MessageType>,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_video_note: Option<bool>,
}

impl SendMessage {
    /// Splits the request into the sender and the message payload.
    #[must_use]
    pub fn into_parts(self) -> (Option<Uuid>, MessageDraft) {
        let draft = MessageDraft {
            message_type: self.message_type,
            content: self.content,
            file_url: self.file_url,
            file_name: self.file_name,
            file_size: self.file_size,
            mime_type: self.mime_type,
            thumbnail_url: self.thumbnail_url,
            is_video_note: self.is_video_note,
        };
        (self.sender_id, draft)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessage {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSchema {
    pub id: Uuid,
    pub chat: Uuid,
    pub sender: UserSchema,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_video_note: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<PopulatedMessage> for MessageSchema {
    fn from(populated: PopulatedMessage) -> Self {
        let message = populated.message;
        let media = message.media;
        Self {
            id: message.id,
            chat: message.chat_id,
            sender: populated.sender.into(),
            message_type: message.message_type,
            content: message.content,
            file_url: media.as_ref().map(|m| m.file_url.clone()),
            file_name: media.as_ref().and_then(|m| m.file_name.clone()),
            file_size: media.as_ref().and_then(|m| m.file_size),
            mime_type: media.as_ref().and_then(|m| m.mime_type.clone()),
            thumbnail_url: media.and_then(|m| m.thumbnail_url),
            is_video_note: message.is_video_note,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: MessageSchema,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}
