use crate::domain::message::{MediaFile, Message, MessageType, PopulatedMessage};
use crate::domain::user::UserProfile;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRecord {
    pub(crate) id: Uuid,
    pub(crate) chat_id: Uuid,
    pub(crate) sender_id: Uuid,
    pub(crate) message_type: String,
    pub(crate) content: Option<String>,
    pub(crate) file_url: Option<String>,
    pub(crate) file_name: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) mime_type: Option<String>,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) is_video_note: bool,
    pub(crate) timestamp: OffsetDateTime,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        let media = record.file_url.map(|file_url| MediaFile {
            file_url,
            file_name: record.file_name,
            file_size: record.file_size,
            mime_type: record.mime_type,
            thumbnail_url: record.thumbnail_url,
        });

        Self {
            id: record.id,
            chat_id: record.chat_id,
            sender_id: record.sender_id,
            // The column is CHECK-constrained to the known variants.
            message_type: MessageType::parse(&record.message_type).unwrap_or_default(),
            content: record.content,
            media,
            is_video_note: record.is_video_note,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PopulatedMessageRecord {
    #[sqlx(flatten)]
    pub(crate) message: MessageRecord,
    pub(crate) sender_username: String,
    pub(crate) sender_mobile: i64,
}

impl From<PopulatedMessageRecord> for PopulatedMessage {
    fn from(record: PopulatedMessageRecord) -> Self {
        let sender =
            UserProfile { id: record.message.sender_id, username: record.sender_username, mobile: record.sender_mobile };
        Self { message: record.message.into(), sender }
    }
}
