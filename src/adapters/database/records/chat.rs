use crate::domain::chat::{Chat, ChatView, ParticipantPair};
use crate::domain::user::UserProfile;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct ChatRecord {
    pub(crate) id: Uuid,
    pub(crate) participant_a: Uuid,
    pub(crate) participant_b: Uuid,
    pub(crate) last_message: Option<String>,
    pub(crate) last_message_time: Option<OffsetDateTime>,
    pub(crate) created_at: Option<OffsetDateTime>,
}

impl From<ChatRecord> for Chat {
    fn from(record: ChatRecord) -> Self {
        Self {
            id: record.id,
            participants: ParticipantPair::from_stored(record.participant_a, record.participant_b),
            last_message: record.last_message,
            last_message_time: record.last_message_time,
            created_at: record.created_at,
        }
    }
}

/// A chat row joined with both participants' profiles.
#[derive(Debug, sqlx::FromRow)]
pub struct ChatViewRecord {
    #[sqlx(flatten)]
    pub(crate) chat: ChatRecord,
    pub(crate) a_username: String,
    pub(crate) a_mobile: i64,
    pub(crate) b_username: String,
    pub(crate) b_mobile: i64,
}

impl From<ChatViewRecord> for ChatView {
    fn from(record: ChatViewRecord) -> Self {
        let first = UserProfile { id: record.chat.participant_a, username: record.a_username, mobile: record.a_mobile };
        let second =
            UserProfile { id: record.chat.participant_b, username: record.b_username, mobile: record.b_mobile };
        Self { chat: record.chat.into(), participants: [first, second] }
    }
}
