use crate::adapters::storage::MediaSink;
use crate::core::moderation::ContentModerator;
use crate::core::transcoder;
use crate::domain::media::{MediaKind, MediaPolicy, UploadDescriptor, extension_for_mime};
use crate::domain::moderation::{DEFAULT_REJECTION_REASON, MediaSample, Verdict};
use crate::error::{AppError, Result};
use bytes::Bytes;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

const TOKEN_LEN: usize = 12;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Clone, Debug)]
struct UploadMetrics {
    uploads_total: Counter<u64>,
    upload_stored_bytes: Histogram<u64>,
    moderation_verdicts_total: Counter<u64>,
}

impl UploadMetrics {
    fn new() -> Self {
        let meter = global::meter("chatter-server");
        Self {
            uploads_total: meter.u64_counter("uploads_total").with_description("Uploads handled, by outcome").build(),
            upload_stored_bytes: meter
                .u64_histogram("upload_stored_bytes")
                .with_description("Size of stored media files after processing")
                .with_unit("By")
                .build(),
            moderation_verdicts_total: meter
                .u64_counter("moderation_verdicts_total")
                .with_description("Moderation verdicts, by verdict")
                .build(),
        }
    }
}

/// A file received from a client, before any processing.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Runs an upload through validation, moderation and transcoding, then
/// stores it.
#[derive(Clone, Debug)]
pub struct UploadService {
    sink: Arc<dyn MediaSink>,
    moderator: Arc<dyn ContentModerator>,
    policy: MediaPolicy,
    moderation_timeout: Duration,
    metrics: UploadMetrics,
}

impl UploadService {
    #[must_use]
    pub fn new(
        sink: Arc<dyn MediaSink>,
        moderator: Arc<dyn ContentModerator>,
        policy: MediaPolicy,
        moderation_timeout: Duration,
    ) -> Self {
        Self { sink, moderator, policy, moderation_timeout, metrics: UploadMetrics::new() }
    }

    /// Accepts one media file and returns the descriptor the client attaches
    /// to its next message. Exactly one file is written on success and none
    /// on failure.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` for files that fail validation or cannot
    /// be decoded, `AppError::ContentRejected`, `AppError::ModerationUnavailable`
    /// or `AppError::ModerationTimeout` from moderation, and
    /// `AppError::Storage` if the write fails.
    #[tracing::instrument(
        skip(self, file),
        fields(mime_type = %file.mime_type, size = file.bytes.len(), stored_as = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn handle_upload(&self, file: IncomingFile, chat_id: Uuid, sender_id: Uuid) -> Result<UploadDescriptor> {
        let result = self.process(file).await;
        let outcome = match &result {
            Ok(_) => "stored",
            Err(AppError::BadRequest(_)) => "invalid",
            Err(AppError::ContentRejected { .. }) => "rejected",
            Err(AppError::ModerationUnavailable(_) | AppError::ModerationTimeout) => "moderation_failed",
            Err(_) => "error",
        };
        self.metrics.uploads_total.add(1, &[KeyValue::new("outcome", outcome)]);
        result
    }

    async fn process(&self, file: IncomingFile) -> Result<UploadDescriptor> {
        let accepted =
            self.policy.validate(file.bytes.len(), &file.mime_type).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let kind = accepted.kind;
        let file = IncomingFile { mime_type: accepted.mime_type, ..file };

        self.screen(&file).await?;

        let (payload, mime_type, extension) = match kind {
            MediaKind::Image => {
                let transcoded = transcoder::transcode_blocking(file.bytes.clone(), file.mime_type.clone())
                    .await
                    .map_err(|e| {
                        tracing::debug!(error = %e, "Image could not be decoded");
                        AppError::BadRequest("Invalid image file".into())
                    })?;
                let extension = if transcoded.reencoded {
                    ".webp".to_string()
                } else {
                    client_extension(&file.file_name, &file.mime_type)
                };
                (Bytes::from(transcoded.bytes), transcoded.mime_type, extension)
            }
            MediaKind::Video => {
                let extension = client_extension(&file.file_name, &file.mime_type);
                (file.bytes.clone(), file.mime_type.clone(), extension)
            }
        };

        let stored_name = generate_file_name(OffsetDateTime::now_utc(), &extension);
        let file_size = payload.len() as u64;
        self.sink.put(&stored_name, payload).await?;

        tracing::Span::current().record("stored_as", stored_name.as_str());
        tracing::info!(file_size, "Upload stored");
        self.metrics.upload_stored_bytes.record(file_size, &[KeyValue::new("type", kind.message_type().as_str())]);

        let file_url = self.sink.public_url(&stored_name);
        let thumbnail_url = (kind == MediaKind::Image).then(|| file_url.clone());

        Ok(UploadDescriptor {
            file_url,
            thumbnail_url,
            file_name: file.file_name,
            file_size,
            mime_type,
            message_type: kind.message_type(),
        })
    }

    /// Blocks the upload unless the moderator approves it within the deadline.
    async fn screen(&self, file: &IncomingFile) -> Result<()> {
        if !self.moderator.is_enabled() {
            return Ok(());
        }

        let sample = MediaSample { bytes: &file.bytes, mime_type: &file.mime_type, file_name: &file.file_name };
        let verdict = tokio::time::timeout(self.moderation_timeout, self.moderator.moderate(sample))
            .await
            .map_err(|_| {
                self.metrics.moderation_verdicts_total.add(1, &[KeyValue::new("verdict", "timeout")]);
                AppError::ModerationTimeout
            })?;

        self.metrics.moderation_verdicts_total.add(1, &[KeyValue::new("verdict", verdict.label())]);

        match verdict {
            Verdict::Appropriate => Ok(()),
            Verdict::Inappropriate { reason } => Err(AppError::ContentRejected {
                reason: reason.unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string()),
            }),
            Verdict::Unavailable { reason } => Err(AppError::ModerationUnavailable(reason)),
        }
    }
}

/// `{epochMillis}_{token}{extension}` with a 12-character base-36 token.
fn generate_file_name(now: OffsetDateTime, extension: &str) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let mut rng = rand::thread_rng();
    let token: String = (0..TOKEN_LEN).map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())])).collect();
    format!("{millis}_{token}{extension}")
}

/// The extension of the client's file name when it is a plain alphanumeric
/// one, otherwise the one implied by the MIME type.
fn client_extension(file_name: &str, mime_type: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= MAX_EXTENSION_LEN && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| extension_for_mime(mime_type).to_string(), |e| format!(".{}", e.to_ascii_lowercase()))
}
