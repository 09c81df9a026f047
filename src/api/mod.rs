use crate::api::rate_limit::{IpKeyExtractor, log_rate_limit_events};
use crate::config::Config;
use crate::core::account_service::AccountService;
use crate::core::chat_service::ChatService;
use crate::core::health_service::HealthService;
use crate::core::message_service::MessageService;
use crate::core::upload_service::UploadService;
use crate::core::user_service::UserService;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod chats;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod rate_limit;
pub mod schemas;
pub mod uploads;
pub mod users;

/// Headroom over the media cap for multipart framing and the text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub account_service: AccountService,
    pub user_service: UserService,
    pub chat_service: ChatService,
    pub message_service: MessageService,
    pub upload_service: UploadService,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub account_service: AccountService,
    pub user_service: UserService,
    pub chat_service: ChatService,
    pub message_service: MessageService,
    pub upload_service: UploadService,
}

/// Configures and returns the primary application router.
///
/// # Errors
/// Returns an error if the rate limiter configuration is invalid.
pub fn app_router(config: Config, services: ServiceContainer) -> anyhow::Result<Router> {
    // Auth tier: signup and login are the only rate-limited routes.
    let auth_interval_ns = 1_000_000_000 / config.rate_limit.auth_per_second.max(1);
    let auth_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(auth_interval_ns))
            .burst_size(config.rate_limit.auth_burst)
            .key_extractor(IpKeyExtractor::new(config.server.trusted_proxies.clone()))
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid auth rate limit configuration"))?,
    );

    let upload_limit = config.media.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let upload_dir = config.media.upload_dir.clone();
    let public_prefix = config.media.public_prefix.clone();

    let state = AppState {
        config,
        account_service: services.account_service,
        user_service: services.user_service,
        chat_service: services.chat_service,
        message_service: services.message_service,
        upload_service: services.upload_service,
    };

    let auth_routes = Router::new()
        .route("/users", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(auth_conf))
        .layer(from_fn(log_rate_limit_events));

    let api_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/search", get(users::search_users))
        .route("/chats", get(chats::list_chats).post(chats::open_chat))
        .route("/chats/{chatId}", get(chats::get_chat))
        .route("/chats/{chatId}/messages", post(messages::send_message))
        .route("/chats/{chatId}/messages/{messageId}", delete(messages::delete_message))
        .route("/upload", post(uploads::upload_media).layer(DefaultBodyLimit::max(upload_limit)));

    let router = Router::new()
        .nest("/api", auth_routes.merge(api_routes))
        .nest_service(&public_prefix, ServeDir::new(upload_dir))
        .layer(PropagateRequestIdLayer::new(axum::http::HeaderName::from_static("x-request-id")))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(
            axum::http::HeaderName::from_static("x-request-id"),
            middleware::MakeRequestUuidV7,
        ))
        .with_state(state);

    Ok(router)
}

pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new().route("/livez", get(health::livez)).route("/readyz", get(health::readyz)).with_state(state)
}
