use crate::api::AppState;
use crate::api::schemas::messages::{DeleteMessage, DeleteResponse, MessageEnvelope, SendMessage};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn send_message(
    State(state): State<AppState>,
    chat_id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<SendMessage>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path(chat_id) = chat_id?;
    let Json(payload) = payload?;
    let (sender_id, draft) = payload.into_parts();
    let sender_id = sender_id.ok_or_else(|| AppError::BadRequest("Sender ID is required".into()))?;

    let message = state.message_service.send(chat_id, sender_id, draft).await?;
    Ok((StatusCode::CREATED, Json(MessageEnvelope { message: message.into() })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    ids: std::result::Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: std::result::Result<Json<DeleteMessage>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Path((chat_id, message_id)) = ids?;
    let Json(payload) = payload?;
    let user_id = payload.user_id.ok_or_else(|| AppError::BadRequest("User ID is required".into()))?;

    state.message_service.delete(chat_id, message_id, user_id).await?;
    Ok(Json(DeleteResponse { success: true, message: "Message deleted successfully" }))
}
