use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod local;

pub use local::LocalSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SinkError> for crate::error::AppError {
    fn from(e: SinkError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Destination for stored media files, addressed by flat file name.
#[async_trait]
pub trait MediaSink: Send + Sync + std::fmt::Debug + 'static {
    /// Writes `data` under `name`. Either the whole file appears or nothing does.
    async fn put(&self, name: &str, data: Bytes) -> Result<(), SinkError>;

    /// Removes `name`. Deleting a missing file is not an error.
    async fn delete(&self, name: &str) -> Result<(), SinkError>;

    /// Confirms the sink is usable.
    async fn check(&self) -> Result<(), SinkError>;

    /// Public URL a stored file is served under.
    fn public_url(&self, name: &str) -> String;

    /// Inverse of [`MediaSink::public_url`]; `None` for URLs this sink does not own.
    fn name_from_url(&self, url: &str) -> Option<String>;
}
