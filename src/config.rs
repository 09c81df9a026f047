use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub media: MediaConfig,

    #[command(flatten)]
    pub moderation: ModerationConfig,

    #[command(flatten)]
    pub messaging: MessagingConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "CHATTER_DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long = "db-max-connections", env = "CHATTER_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long = "db-min-connections", env = "CHATTER_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(long = "db-acquire-timeout-secs", env = "CHATTER_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 10)]
    pub acquire_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "CHATTER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CHATTER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management (health) server
    #[arg(long, env = "CHATTER_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for in-flight work during shutdown
    #[arg(long, env = "CHATTER_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "CHATTER_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed for signup/login
    #[arg(long = "auth-rate-limit-per-second", env = "CHATTER_AUTH_RATE_LIMIT_PER_SECOND", default_value_t = 2)]
    pub auth_per_second: u32,

    /// Burst allowance for signup/login
    #[arg(long = "auth-rate-limit-burst", env = "CHATTER_AUTH_RATE_LIMIT_BURST", default_value_t = 5)]
    pub auth_burst: u32,
}

#[derive(Clone, Debug, Args)]
pub struct MediaConfig {
    /// Directory uploaded media is written to
    #[arg(long, env = "CHATTER_UPLOAD_DIR", default_value = "public/uploads")]
    pub upload_dir: PathBuf,

    /// URL prefix the upload directory is served under
    #[arg(long, env = "CHATTER_UPLOAD_PUBLIC_PREFIX", default_value = "/uploads")]
    pub public_prefix: String,

    /// Max upload size in bytes (Default: 25MiB)
    #[arg(long, env = "CHATTER_MAX_UPLOAD_BYTES", default_value_t = 26_214_400)]
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug, Args)]
pub struct ModerationConfig {
    /// Screen uploaded media with the external moderation model
    #[arg(long = "moderation-enabled", env = "CHATTER_MODERATION_ENABLED", default_value_t = false)]
    pub enabled: bool,

    /// API key for the moderation backend
    #[arg(long = "moderation-api-key", env = "CHATTER_MODERATION_API_KEY")]
    pub api_key: Option<String>,

    /// Model identifier sent to the moderation backend
    #[arg(long = "moderation-model", env = "CHATTER_MODERATION_MODEL", default_value = "llama-3.1-8b-instant")]
    pub model: String,

    /// OpenAI-compatible chat completions endpoint
    #[arg(
        long = "moderation-endpoint",
        env = "CHATTER_MODERATION_ENDPOINT",
        default_value = "https://api.groq.com/openai/v1/chat/completions"
    )]
    pub endpoint: String,

    /// Upper bound on a single moderation call
    #[arg(long = "moderation-timeout-ms", env = "CHATTER_MODERATION_TIMEOUT_MS", default_value_t = 15_000)]
    pub timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct MessagingConfig {
    /// Let any chat participant delete the other participant's messages
    #[arg(
        long,
        env = "CHATTER_ALLOW_PEER_DELETION",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub allow_peer_deletion: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Upgrade legacy plaintext passwords to hashes on successful login
    #[arg(
        long,
        env = "CHATTER_REHASH_LEGACY_PASSWORDS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub rehash_legacy_passwords: bool,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the database readiness check
    #[arg(long, env = "CHATTER_HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,

    /// Timeout for the upload directory readiness check
    #[arg(long, env = "CHATTER_HEALTH_STORAGE_TIMEOUT_MS", default_value_t = 2000)]
    pub storage_timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "CHATTER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics (disabled when unset)
    #[arg(long, env = "CHATTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
