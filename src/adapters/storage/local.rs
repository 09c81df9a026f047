use crate::adapters::storage::{MediaSink, SinkError};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Stores media as flat files in one directory that is served statically.
#[derive(Clone, Debug)]
pub struct LocalSink {
    root: PathBuf,
    public_prefix: String,
}

impl LocalSink {
    /// Creates the sink, making sure the directory exists.
    ///
    /// # Errors
    /// Returns `SinkError::Io` if the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Result<Self, SinkError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root, public_prefix: public_prefix.trim_end_matches('/').to_string() })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, SinkError> {
        let valid = !name.is_empty()
            && name != "."
            && !name.contains("..")
            && !name.contains('/')
            && !name.contains('\\')
            && !name.contains('\0');
        if !valid {
            return Err(SinkError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    async fn write_part(part: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(part).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl MediaSink for LocalSink {
    #[tracing::instrument(level = "debug", skip(self, data), fields(size = data.len()), err(level = "warn"))]
    async fn put(&self, name: &str, data: Bytes) -> Result<(), SinkError> {
        let path = self.path_for(name)?;
        let part = self.root.join(format!("{name}.part"));

        let result = match Self::write_part(&part, &data).await {
            Ok(()) => fs::rename(&part, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&part).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(error = %cleanup, file = %part.display(), "Failed to remove partial file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err(level = "warn"))]
    async fn delete(&self, name: &str) -> Result<(), SinkError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn check(&self) -> Result<(), SinkError> {
        let meta = fs::metadata(&self.root).await?;
        if !meta.is_dir() {
            return Err(SinkError::Io(std::io::Error::other(format!("{} is not a directory", self.root.display()))));
        }
        if meta.permissions().readonly() {
            return Err(SinkError::Io(std::io::Error::other(format!("{} is read-only", self.root.display()))));
        }
        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{name}", self.public_prefix)
    }

    fn name_from_url(&self, url: &str) -> Option<String> {
        let name = url.strip_prefix(&self.public_prefix)?.strip_prefix('/')?;
        self.path_for(name).ok().map(|_| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sink() -> (tempfile::TempDir, LocalSink) {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path().join("uploads"), "/uploads/").await.unwrap();
        (dir, sink)
    }

    #[tokio::test]
    async fn test_put_then_delete() {
        let (_dir, sink) = sink().await;
        sink.put("1_abc.webp", Bytes::from_static(b"data")).await.unwrap();

        let path = sink.root.join("1_abc.webp");
        assert_eq!(fs::read(&path).await.unwrap(), b"data");
        assert!(!sink.root.join("1_abc.webp.part").exists());

        sink.delete("1_abc.webp").await.unwrap();
        assert!(!path.exists());
        // Second delete is a no-op.
        sink.delete("1_abc.webp").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (_dir, sink) = sink().await;
        for name in ["../escape", "a/b", "", "..", "a\\b"] {
            assert!(matches!(sink.put(name, Bytes::new()).await, Err(SinkError::InvalidName(_))), "{name}");
        }
    }

    #[tokio::test]
    async fn test_url_mapping() {
        let (_dir, sink) = sink().await;
        assert_eq!(sink.public_url("x.webp"), "/uploads/x.webp");
        assert_eq!(sink.name_from_url("/uploads/x.webp").as_deref(), Some("x.webp"));
        assert_eq!(sink.name_from_url("/uploads/../etc/passwd"), None);
        assert_eq!(sink.name_from_url("https://elsewhere/x.webp"), None);
    }

    #[tokio::test]
    async fn test_check() {
        let (dir, sink) = sink().await;
        sink.check().await.unwrap();

        fs::remove_dir(dir.path().join("uploads")).await.unwrap();
        assert!(sink.check().await.is_err());
    }
}
