use crate::adapters::database::DbPool;
use crate::adapters::database::chat_repo::ChatRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::adapters::storage::MediaSink;
use crate::domain::message::{Message, MessageDraft, PopulatedMessage};
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct MessageMetrics {
    messages_sent_total: Counter<u64>,
    messages_deleted_total: Counter<u64>,
    media_cleanup_failures_total: Counter<u64>,
}

impl MessageMetrics {
    fn new() -> Self {
        let meter = global::meter("chatter-server");
        Self {
            messages_sent_total: meter
                .u64_counter("messages_sent_total")
                .with_description("Total messages sent, by message type")
                .build(),
            messages_deleted_total: meter
                .u64_counter("messages_deleted_total")
                .with_description("Total messages deleted, by who deleted them")
                .build(),
            media_cleanup_failures_total: meter
                .u64_counter("media_cleanup_failures_total")
                .with_description("Media files that could not be removed after their message was deleted")
                .build(),
        }
    }
}

/// Who may delete a message in a chat they take part in.
#[derive(Debug, Clone, Copy)]
pub struct DeletionPolicy {
    allow_peer_deletion: bool,
}

impl DeletionPolicy {
    #[must_use]
    pub const fn new(allow_peer_deletion: bool) -> Self {
        Self { allow_peer_deletion }
    }

    /// Assumes the requester is already known to be a participant.
    #[must_use]
    pub fn permits(&self, message: &Message, requester_id: Uuid) -> bool {
        message.is_from(requester_id) || self.allow_peer_deletion
    }
}

#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    chat_repo: ChatRepository,
    message_repo: MessageRepository,
    user_repo: UserRepository,
    sink: Arc<dyn MediaSink>,
    deletion_policy: DeletionPolicy,
    metrics: MessageMetrics,
}

impl MessageService {
    #[must_use]
    pub fn new(
        pool: DbPool,
        chat_repo: ChatRepository,
        message_repo: MessageRepository,
        user_repo: UserRepository,
        sink: Arc<dyn MediaSink>,
        deletion_policy: DeletionPolicy,
    ) -> Self {
        Self { pool, chat_repo, message_repo, user_repo, sink, deletion_policy, metrics: MessageMetrics::new() }
    }

    /// Stores a message and moves the chat summary to it, atomically.
    /// Returns the message with its sender's profile.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for an invalid payload,
    /// `AppError::NotFound` if the chat does not exist and
    /// `AppError::Forbidden` if the sender is not a participant.
    #[tracing::instrument(
        skip(self, draft),
        fields(message_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn send(&self, chat_id: Uuid, sender_id: Uuid, draft: MessageDraft) -> Result<PopulatedMessage> {
        let new_message = draft.validate().map_err(AppError::BadRequest)?;

        let mut tx = self.pool.begin().await?;

        let chat =
            self.chat_repo.find_by_id(&mut tx, chat_id).await?.ok_or_else(|| AppError::NotFound("Chat not found".into()))?;
        if !chat.is_participant(sender_id) {
            return Err(AppError::Forbidden("You are not a participant in this chat".into()));
        }

        let message =
            self.message_repo.create(&mut tx, chat_id, sender_id, &new_message, time::OffsetDateTime::now_utc()).await?;
        let advanced =
            self.chat_repo.advance_summary(&mut tx, chat_id, &message.display_text(), message.timestamp).await?;
        if !advanced {
            tracing::debug!("Chat summary already points at a newer message");
        }

        let sender = self.user_repo.find_profile(&mut tx, sender_id).await?.ok_or(AppError::Internal)?;

        tx.commit().await?;

        tracing::Span::current().record("message_id", tracing::field::display(message.id));
        self.metrics.messages_sent_total.add(1, &[KeyValue::new("type", message.message_type.as_str())]);

        Ok(PopulatedMessage { message, sender })
    }

    /// Deletes a message, then removes its media file on a best-effort basis
    /// once no other message references it.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the chat or the message (within that
    /// chat) does not exist and `AppError::Forbidden` if the requester may not
    /// delete it.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, chat_id: Uuid, message_id: Uuid, requester_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Held until commit so the summary recompute sees a stable tail.
        let chat =
            self.chat_repo.lock_by_id(&mut tx, chat_id).await?.ok_or_else(|| AppError::NotFound("Chat not found".into()))?;
        if !chat.is_participant(requester_id) {
            return Err(AppError::Forbidden("You can only delete messages in chats you're part of".into()));
        }

        let message = self
            .message_repo
            .find_in_chat(&mut tx, chat_id, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".into()))?;

        if !self.deletion_policy.permits(&message, requester_id) {
            return Err(AppError::Forbidden("You can only delete your own messages".into()));
        }

        let peer_deletion = !message.is_from(requester_id);

        self.message_repo.delete(&mut tx, message.id).await?;
        self.chat_repo.recompute_summary(&mut tx, chat_id).await?;

        // Forwarded media shares one file; keep it while any message points at it.
        let mut orphaned_file = None;
        if let Some(media) = &message.media {
            if self.message_repo.file_in_use(&mut tx, &media.file_url).await? {
                tracing::debug!(file_url = %media.file_url, "Media file still referenced, keeping it");
            } else {
                orphaned_file = Some(media.file_url.as_str());
            }
        }
        tx.commit().await?;

        if peer_deletion {
            tracing::info!(
                target: "audit",
                event = "peer_message_deleted",
                chat_id = %chat_id,
                message_id = %message.id,
                sender_id = %message.sender_id,
                deleted_by = %requester_id,
                "Participant deleted a message sent by the other participant"
            );
        }
        let actor = if peer_deletion { "peer" } else { "sender" };
        self.metrics.messages_deleted_total.add(1, &[KeyValue::new("actor", actor)]);

        if let Some(file_url) = orphaned_file {
            self.remove_media(file_url).await;
        }

        Ok(())
    }

    async fn remove_media(&self, file_url: &str) {
        let Some(name) = self.sink.name_from_url(file_url) else {
            tracing::debug!(file_url = %file_url, "Media URL is not owned by the sink, nothing to remove");
            return;
        };

        if let Err(e) = self.sink.delete(&name).await {
            tracing::warn!(error = %e, file = %name, "Failed to remove media file of deleted message");
            self.metrics.media_cleanup_failures_total.add(1, &[]);
        }
    }
}
