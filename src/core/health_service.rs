use crate::adapters::database::DbPool;
use crate::adapters::storage::MediaSink;
use crate::config::HealthConfig;
use opentelemetry::{KeyValue, global, metrics::Histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct HealthMetrics {
    pub health_check_duration_seconds: Histogram<f64>,
}

impl HealthMetrics {
    #[must_use]
    pub fn new() -> Self {
        let meter = global::meter("chatter-server");
        Self {
            health_check_duration_seconds: meter
                .f64_histogram("health_check_duration_seconds")
                .with_description("Duration of health checks")
                .build(),
        }
    }
}

impl Default for HealthMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
    sink: Arc<dyn MediaSink>,
    config: HealthConfig,
    metrics: HealthMetrics,
}

impl HealthService {
    #[must_use]
    pub fn new(pool: DbPool, sink: Arc<dyn MediaSink>, config: HealthConfig) -> Self {
        Self { pool, sink, config, metrics: HealthMetrics::new() }
    }

    /// # Errors
    /// Returns a description of the failure if the database is unreachable or slow.
    pub async fn check_db(&self) -> Result<(), String> {
        let db_timeout = Duration::from_millis(self.config.db_timeout_ms);
        let start = Instant::now();

        let res = match timeout(db_timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("Database connection failed: {e}")),
            Err(_) => Err("Database connection timed out".to_string()),
        };

        self.metrics
            .health_check_duration_seconds
            .record(start.elapsed().as_secs_f64(), &[KeyValue::new("component", "database")]);
        res
    }

    /// # Errors
    /// Returns a description of the failure if the upload directory is unusable.
    pub async fn check_storage(&self) -> Result<(), String> {
        let storage_timeout = Duration::from_millis(self.config.storage_timeout_ms);
        let start = Instant::now();

        let res = match timeout(storage_timeout, self.sink.check()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Upload directory check failed: {e}")),
            Err(_) => Err("Upload directory check timed out".to_string()),
        };

        self.metrics
            .health_check_duration_seconds
            .record(start.elapsed().as_secs_f64(), &[KeyValue::new("component", "storage")]);
        res
    }
}
