use crate::api::AppState;
use crate::api::schemas::users::{AuthResponse, Login, Signup};
use crate::error::{AppError, Result};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};

pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Signup>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let (Some(username), Some(mobile), Some(password)) = (payload.username, payload.mobile, payload.password) else {
        return Err(AppError::BadRequest("Username, mobile number, and password are required".into()));
    };

    let user = state.account_service.signup(&username, mobile, &password).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { message: "User created successfully", user: (&user).into() })))
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Login>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let (Some(mobile), Some(password)) = (payload.mobile, payload.password.filter(|p| !p.is_empty())) else {
        return Err(AppError::BadRequest("Mobile number and password are required".into()));
    };

    let user = state.account_service.login(mobile, &password).await?;
    Ok(Json(AuthResponse { message: "Login successful", user: (&user).into() }))
}
