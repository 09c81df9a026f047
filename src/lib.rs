#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod telemetry;

use crate::adapters::database::DbPool;
use crate::adapters::database::chat_repo::ChatRepository;
use crate::adapters::database::message_repo::MessageRepository;
use crate::adapters::database::user_repo::UserRepository;
use crate::adapters::storage::{LocalSink, MediaSink};
use crate::api::ServiceContainer;
use crate::config::Config;
use crate::core::account_service::AccountService;
use crate::core::auth::RehashPolicy;
use crate::core::chat_service::ChatService;
use crate::core::health_service::HealthService;
use crate::core::message_service::{DeletionPolicy, MessageService};
use crate::core::moderation::ContentModerator;
use crate::core::upload_service::UploadService;
use crate::core::user_service::UserService;
use crate::domain::media::MediaPolicy;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Everything the routers need, wired from one configuration.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    sink: Option<Arc<dyn MediaSink>>,
    moderator: Option<Arc<dyn ContentModerator>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, pool: None, sink: None, moderator: None }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MediaSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_moderator(mut self, moderator: Arc<dyn ContentModerator>) -> Self {
        self.moderator = Some(moderator);
        self
    }

    /// Wires services. The sink and moderator default to the ones described by
    /// the configuration.
    ///
    /// # Errors
    /// Returns an error if no database was supplied, the upload directory
    /// cannot be created, or the moderator configuration is invalid.
    pub async fn build(self) -> anyhow::Result<App> {
        let config = self.config;
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("database pool is required"))?;

        let sink: Arc<dyn MediaSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(LocalSink::new(&config.media.upload_dir, &config.media.public_prefix).await?),
        };
        let moderator = match self.moderator {
            Some(moderator) => moderator,
            None => adapters::moderation::from_config(&config.moderation)?,
        };

        let user_repo = UserRepository::new();
        let chat_repo = ChatRepository::new();
        let message_repo = MessageRepository::new();

        let account_service =
            AccountService::new(pool.clone(), user_repo.clone(), RehashPolicy::new(config.auth.rehash_legacy_passwords));
        let user_service = UserService::new(pool.clone(), user_repo.clone());
        let chat_service = ChatService::new(pool.clone(), chat_repo.clone(), message_repo.clone(), user_repo.clone());
        let message_service = MessageService::new(
            pool.clone(),
            chat_repo,
            message_repo,
            user_repo,
            Arc::clone(&sink),
            DeletionPolicy::new(config.messaging.allow_peer_deletion),
        );
        let upload_service = UploadService::new(
            Arc::clone(&sink),
            moderator,
            MediaPolicy::new(config.media.max_upload_bytes),
            Duration::from_millis(config.moderation.timeout_ms),
        );
        let health_service = HealthService::new(pool, sink, config.health.clone());

        Ok(App {
            services: ServiceContainer { account_service, user_service, chat_service, message_service, upload_service },
            health_service,
        })
    }
}

/// Applies pending schema migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Routes panics through tracing so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(location = %location, panic = %payload, "Panic occurred");
    }));
}

/// Flips `shutdown_tx` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            () = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        let _ = shutdown_tx.send(true);
    });
}
