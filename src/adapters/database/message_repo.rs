use crate::adapters::database::records::{MessageRecord, PopulatedMessageRecord};
use crate::domain::message::{Message, NewMessage, PopulatedMessage};
use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

const MESSAGE_COLUMNS: &str = r#"id, chat_id, sender_id, message_type, content, file_url, file_name, file_size,
    mime_type, thumbnail_url, is_video_note, "timestamp""#;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Records a new message in the database.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message))]
    pub(crate) async fn create(
        &self,
        conn: &mut PgConnection,
        chat_id: Uuid,
        sender_id: Uuid,
        message: &NewMessage,
        timestamp: OffsetDateTime,
    ) -> Result<Message> {
        let media = message.media.as_ref();
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            r#"
            INSERT INTO messages (id, chat_id, sender_id, message_type, content, file_url, file_name, file_size,
                                  mime_type, thumbnail_url, is_video_note, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(chat_id)
        .bind(sender_id)
        .bind(message.message_type.as_str())
        .bind(&message.content)
        .bind(media.map(|m| m.file_url.as_str()))
        .bind(media.and_then(|m| m.file_name.as_deref()))
        .bind(media.and_then(|m| m.file_size))
        .bind(media.and_then(|m| m.mime_type.as_deref()))
        .bind(media.and_then(|m| m.thumbnail_url.as_deref()))
        .bind(message.is_video_note)
        .bind(timestamp)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }

    /// Finds a message only if it belongs to `chat_id`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_in_chat(
        &self,
        conn: &mut PgConnection,
        chat_id: Uuid,
        message_id: Uuid,
    ) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1 AND chat_id = $2"
        ))
        .bind(message_id)
        .bind(chat_id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the deletion fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn delete(&self, conn: &mut PgConnection, message_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1").bind(message_id).execute(conn).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Whether any message, in any chat, still points at `file_url`.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn file_in_use(&self, conn: &mut PgConnection, file_url: &str) -> Result<bool> {
        let in_use = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM messages WHERE file_url = $1)")
            .bind(file_url)
            .fetch_one(conn)
            .await?;
        Ok(in_use)
    }

    /// The chat's messages with their senders, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_populated(&self, conn: &mut PgConnection, chat_id: Uuid) -> Result<Vec<PopulatedMessage>> {
        let records = sqlx::query_as::<_, PopulatedMessageRecord>(
            r#"
            SELECT m.id, m.chat_id, m.sender_id, m.message_type, m.content, m.file_url, m.file_name, m.file_size,
                   m.mime_type, m.thumbnail_url, m.is_video_note, m."timestamp",
                   u.username AS sender_username, u.mobile AS sender_mobile
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.chat_id = $1
            ORDER BY m."timestamp" ASC, m.id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }
}
