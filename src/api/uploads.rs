use crate::api::AppState;
use crate::api::schemas::uploads::UploadResponse;
use crate::core::upload_service::IncomingFile;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

const REQUIRED_FIELDS: &str = "File, chatId, and senderId are required";

pub async fn upload_media(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let max_mib = state.config.media.max_upload_bytes / (1024 * 1024);
    let read_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::BadRequest(format!("File size too large. Maximum size is {max_mib}MB"))
        } else {
            AppError::BadRequest(e.body_text())
        }
    };

    let mut file = None;
    let mut chat_id = None;
    let mut sender_id = None;

    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let bytes = field.bytes().await.map_err(read_error)?;
                file = Some(IncomingFile { file_name, mime_type, bytes });
            }
            Some("chatId") => chat_id = Some(field.text().await.map_err(read_error)?),
            Some("senderId") => sender_id = Some(field.text().await.map_err(read_error)?),
            _ => {}
        }
    }

    let (Some(file), Some(chat_id), Some(sender_id)) = (file, non_blank(chat_id), non_blank(sender_id)) else {
        return Err(AppError::BadRequest(REQUIRED_FIELDS.into()));
    };
    let chat_id = parse_id(&chat_id, "chatId")?;
    let sender_id = parse_id(&sender_id, "senderId")?;

    let descriptor = state.upload_service.handle_upload(file, chat_id, sender_id).await?;
    Ok(Json(UploadResponse::from(descriptor)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {field}")))
}
