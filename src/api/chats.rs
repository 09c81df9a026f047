use crate::api::AppState;
use crate::api::schemas::chats::{ChatEnvelope, ChatList, ListChatsQuery, OpenChat, OpenChatResponse};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

pub async fn list_chats(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListChatsQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let user_id = query.user_id.ok_or_else(|| AppError::BadRequest("User ID is required".into()))?;

    let chats = state.chat_service.list_for(user_id).await?;
    Ok(Json(ChatList { chats: chats.into_iter().map(Into::into).collect() }))
}

pub async fn open_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OpenChat>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let (Some(user_id), Some(other_user_id)) = (payload.user_id, payload.other_user_id) else {
        return Err(AppError::BadRequest("Both user IDs are required".into()));
    };

    let (view, is_new) = state.chat_service.open(user_id, other_user_id).await?;
    let status = if is_new { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(OpenChatResponse { chat: view.into(), is_new })))
}

pub async fn get_chat(
    State(state): State<AppState>,
    chat_id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(chat_id) = chat_id?;
    let thread = state.chat_service.thread(chat_id).await?;
    Ok(Json(ChatEnvelope { chat: thread.into() }))
}
