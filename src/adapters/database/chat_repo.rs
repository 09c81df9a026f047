use crate::adapters::database::records::{ChatRecord, ChatViewRecord};
use crate::domain::chat::{Chat, ChatView, ParticipantPair};
use crate::error::Result;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

const CHAT_COLUMNS: &str = "id, participant_a, participant_b, last_message, last_message_time, created_at";

const VIEW_SELECT: &str = r#"
    SELECT c.id, c.participant_a, c.participant_b, c.last_message, c.last_message_time, c.created_at,
           ua.username AS a_username, ua.mobile AS a_mobile,
           ub.username AS b_username, ub.mobile AS b_mobile
    FROM chats c
    JOIN users ua ON ua.id = c.participant_a
    JOIN users ub ON ub.id = c.participant_b
"#;

#[derive(Clone, Debug, Default)]
pub struct ChatRepository {}

impl ChatRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Returns the chat for `pair`, creating it if needed. The flag is true
    /// when this call created it.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_or_create(&self, conn: &mut PgConnection, pair: ParticipantPair) -> Result<(Chat, bool)> {
        let inserted = sqlx::query_as::<_, ChatRecord>(&format!(
            r#"
            INSERT INTO chats (id, participant_a, participant_b)
            VALUES ($1, $2, $3)
            ON CONFLICT (participant_a, participant_b) DO NOTHING
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(pair.first())
        .bind(pair.second())
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(record) = inserted {
            return Ok((record.into(), true));
        }

        let existing = sqlx::query_as::<_, ChatRecord>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE participant_a = $1 AND participant_b = $2"
        ))
        .bind(pair.first())
        .bind(pair.second())
        .fetch_one(conn)
        .await?;

        Ok((existing.into(), false))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_by_id(&self, conn: &mut PgConnection, chat_id: Uuid) -> Result<Option<Chat>> {
        let record = sqlx::query_as::<_, ChatRecord>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"))
            .bind(chat_id)
            .fetch_optional(conn)
            .await?;
        Ok(record.map(Into::into))
    }

    /// Fetches the chat and holds its row lock until the transaction ends.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn lock_by_id(&self, conn: &mut PgConnection, chat_id: Uuid) -> Result<Option<Chat>> {
        let record =
            sqlx::query_as::<_, ChatRecord>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1 FOR UPDATE"))
                .bind(chat_id)
                .fetch_optional(conn)
                .await?;
        Ok(record.map(Into::into))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn find_view(&self, conn: &mut PgConnection, chat_id: Uuid) -> Result<Option<ChatView>> {
        let record = sqlx::query_as::<_, ChatViewRecord>(&format!("{VIEW_SELECT} WHERE c.id = $1"))
            .bind(chat_id)
            .fetch_optional(conn)
            .await?;
        Ok(record.map(Into::into))
    }

    /// Chats the user takes part in, most recently active first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn list_views_for(&self, conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<ChatView>> {
        let records = sqlx::query_as::<_, ChatViewRecord>(&format!(
            r#"
            {VIEW_SELECT}
            WHERE c.participant_a = $1 OR c.participant_b = $1
            ORDER BY c.last_message_time DESC NULLS LAST, c.created_at DESC, c.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Moves the summary forward to `(text, at)` unless a later message
    /// already owns it.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, text))]
    pub(crate) async fn advance_summary(
        &self,
        conn: &mut PgConnection,
        chat_id: Uuid,
        text: &str,
        at: OffsetDateTime,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET last_message = $2, last_message_time = $3
            WHERE id = $1 AND (last_message_time IS NULL OR last_message_time <= $3)
            "#,
        )
        .bind(chat_id)
        .bind(text)
        .bind(at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Resets the summary to the chat's current last message, or clears it
    /// when no messages remain.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn recompute_summary(&self, conn: &mut PgConnection, chat_id: Uuid) -> Result<Chat> {
        let record = sqlx::query_as::<_, ChatRecord>(&format!(
            r#"
            UPDATE chats
            SET (last_message, last_message_time) = (
                SELECT m.content, m."timestamp"
                FROM messages m
                WHERE m.chat_id = $1
                ORDER BY m."timestamp" DESC, m.id DESC
                LIMIT 1
            )
            WHERE id = $1
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(chat_id)
        .fetch_one(conn)
        .await?;

        Ok(record.into())
    }
}
