//! File Identity Resolution
//!
//! Maps a path to the durable identity of the physical file behind it. The
//! identity is the pair (device, inode) read through a status query, kept at
//! full 64-bit precision. Two paths that reach the same file (hard links, a
//! rename) resolve equal; a path that is deleted and recreated resolves to a
//! new identity.
//!
//! Nothing is cached here. Every call asks the filesystem.

use crate::error::WriteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Opaque, comparable token for one physical file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Result<Self, WriteError> {
        use std::os::unix::fs::MetadataExt;
        Ok(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &std::fs::Metadata) -> Result<Self, WriteError> {
        Err(WriteError::Unsupported(
            "durable file IDs are only read on unix targets".to_string(),
        ))
    }

    pub fn device(&self) -> u64 {
        self.dev
    }

    pub fn inode(&self) -> u64 {
        self.ino
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.dev, self.ino)
    }
}

/// Resolve `path` to the identity of the file it currently references.
///
/// Fails with [`WriteError::NotFound`] when nothing exists at `path`.
pub async fn resolve(path: impl AsRef<Path>) -> Result<FileIdentity, WriteError> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| WriteError::from_io(path, e))?;
    FileIdentity::from_metadata(&metadata)
}
