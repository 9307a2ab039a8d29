//! Physical write backends.

use async_trait::async_trait;
use std::path::Path;

/// Performs the physical write for one request.
///
/// A backend replaces the whole file content with `data`. It is only ever
/// called by the serializer, at most once at a time per identity.
#[async_trait]
pub trait WriteBackend: Send + Sync {
    async fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()>;
}

/// Default backend: truncate and write through `tokio::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

#[async_trait]
impl WriteBackend for FsBackend {
    async fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_backend_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a much longer original").unwrap();

        FsBackend.write(&path, b"short").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[tokio::test]
    async fn test_fs_backend_reports_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("a.txt");
        let err = FsBackend.write(&path, b"x").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
