use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

const OK: &str = "ok";
const ERROR: &str = "error";

pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Ready when both the database and the upload directory answer in time.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let (database, storage) = tokio::join!(state.health_service.check_db(), state.health_service.check_storage());

    let database = component_status("database", database);
    let storage = component_status("storage", storage);
    let ready = database == OK && storage == OK;

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = HealthResponse {
        status: if ready { OK } else { ERROR }.to_string(),
        database: database.to_string(),
        storage: storage.to_string(),
    };

    (status_code, Json(body))
}

fn component_status(component: &'static str, result: Result<(), String>) -> &'static str {
    match result {
        Ok(()) => OK,
        Err(e) => {
            tracing::warn!(error = %e, component, "Readiness probe failed");
            ERROR
        }
    }
}
