use crate::adapters::database::DbPool;
use crate::adapters::database::chat_repo::ChatRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::domain::chat::{ChatThread, ChatView, ParticipantPair};
use crate::error::{AppError, Result};
use opentelemetry::{global, metrics::Counter};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct ChatMetrics {
    chats_created_total: Counter<u64>,
}

impl ChatMetrics {
    fn new() -> Self {
        let meter = global::meter("chatter-server");
        Self {
            chats_created_total: meter
                .u64_counter("chats_created_total")
                .with_description("Total number of chats opened for a new pair of users")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatService {
    pool: DbPool,
    chat_repo: ChatRepository,
    message_repo: MessageRepository,
    user_repo: UserRepository,
    metrics: ChatMetrics,
}

impl ChatService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        chat_repo: ChatRepository,
        message_repo: MessageRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self { pool, chat_repo, message_repo, user_repo, metrics: ChatMetrics::new() }
    }

    /// Returns the chat between two users, creating it on first contact.
    /// The flag is true when this call created it.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` when both ids are the same user and
    /// `AppError::NotFound` when either user does not exist.
    #[tracing::instrument(skip(self), fields(chat_id = tracing::field::Empty), err(level = "warn"))]
    pub async fn open(&self, user_id: Uuid, other_user_id: Uuid) -> Result<(ChatView, bool)> {
        let pair = ParticipantPair::new(user_id, other_user_id).map_err(AppError::BadRequest)?;

        let mut conn = self.pool.acquire().await?;
        if self.user_repo.count_existing(&mut conn, &pair.as_array()).await? != 2 {
            return Err(AppError::NotFound("User not found".into()));
        }

        let (chat, created) = self.chat_repo.find_or_create(&mut conn, pair).await?;
        tracing::Span::current().record("chat_id", tracing::field::display(chat.id));

        if created {
            tracing::info!("Chat created");
            self.metrics.chats_created_total.add(1, &[]);
        }

        let view = self.chat_repo.find_view(&mut conn, chat.id).await?.ok_or(AppError::Internal)?;
        Ok((view, created))
    }

    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<ChatView>> {
        let mut conn = self.pool.acquire().await?;
        self.chat_repo.list_views_for(&mut conn, user_id).await
    }

    /// Loads a chat with its participants and full message history.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the chat does not exist.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn thread(&self, chat_id: Uuid) -> Result<ChatThread> {
        let mut tx = self.pool.begin().await?;
        // One snapshot for the chat row and its messages.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY").execute(&mut *tx).await?;

        let view =
            self.chat_repo.find_view(&mut tx, chat_id).await?.ok_or_else(|| AppError::NotFound("Chat not found".into()))?;
        let messages = self.message_repo.list_populated(&mut tx, chat_id).await?;
        tx.commit().await?;

        Ok(ChatThread { view, messages })
    }
}
