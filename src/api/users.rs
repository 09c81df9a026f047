use crate::api::AppState;
use crate::api::schemas::users::{ListUsersQuery, SearchUsersQuery, UserList};
use crate::error::Result;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};

pub async fn list_users(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let users = state.user_service.list(query.current_user_id).await?;
    Ok(Json(UserList { users: users.into_iter().map(Into::into).collect() }))
}

pub async fn search_users(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchUsersQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let q = query.q.unwrap_or_default();
    let users = state.user_service.search(&q, query.current_user_id).await?;
    Ok(Json(UserList { users: users.into_iter().map(Into::into).collect() }))
}
