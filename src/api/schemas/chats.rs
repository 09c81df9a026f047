use crate::api::schemas::messages::MessageSchema;
use crate::api::schemas::users::UserSchema;
use crate::domain::chat::{ChatThread, ChatView};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenChat {
    pub user_id: Option<Uuid>,
    pub other_user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChatsQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSchema {
    pub id: Uuid,
    pub participants: Vec<UserSchema>,
    pub last_message: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageSchema>>,
}

impl From<ChatView> for ChatSchema {
    fn from(view: ChatView) -> Self {
        Self {
            id: view.chat.id,
            participants: view.participants.into_iter().map(Into::into).collect(),
            last_message: view.chat.last_message,
            last_message_time: view.chat.last_message_time,
            created_at: view.chat.created_at,
            messages: None,
        }
    }
}

impl From<ChatThread> for ChatSchema {
    fn from(thread: ChatThread) -> Self {
        let mut schema = Self::from(thread.view);
        schema.messages = Some(thread.messages.into_iter().map(Into::into).collect());
        schema
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenChatResponse {
    pub chat: ChatSchema,
    pub is_new: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatEnvelope {
    pub chat: ChatSchema,
}

#[derive(Debug, Serialize)]
pub struct ChatList {
    pub chats: Vec<ChatSchema>,
}
