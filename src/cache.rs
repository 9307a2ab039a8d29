//! Cache Files
//!
//! Derives a cache file location from a source file's identity rather than
//! its path, so a cache entry follows its source across renames and hard
//! links on the same volume. Cache files are `<identity>.cache`, plain bytes.
//!
//! Identity says nothing about content: a file edited in place keeps its
//! identity. When fingerprinting is enabled a BLAKE3 digest of the source is
//! kept in `<identity>.fingerprint` and checked on read, so such edits turn
//! into cache misses.

use crate::config::CacheConfig;
use crate::error::WriteError;
use crate::identity::{self, FileIdentity};
use crate::write::{Payload, WriteSerializer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CACHE_EXTENSION: &str = "cache";
const FINGERPRINT_EXTENSION: &str = "fingerprint";

/// Maps source files to cache file paths inside one directory.
#[derive(Debug, Clone)]
pub struct CachePathDeriver {
    cache_dir: PathBuf,
}

impl CachePathDeriver {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, WriteError> {
        Ok(Self::new(config.resolve_dir()?))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve `source` and return its cache path together with the identity.
    ///
    /// Writers should pass the returned identity to
    /// [`WriteSerializer::submit_resolved`]; the cache file may not exist yet.
    pub async fn cache_path_for(
        &self,
        source: impl AsRef<Path>,
    ) -> Result<(PathBuf, FileIdentity), WriteError> {
        let identity = identity::resolve(source).await?;
        Ok((self.cache_path_for_identity(&identity), identity))
    }

    pub fn cache_path_for_identity(&self, identity: &FileIdentity) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", identity, CACHE_EXTENSION))
    }

    fn fingerprint_path_for_identity(&self, identity: &FileIdentity) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", identity, FINGERPRINT_EXTENSION))
    }
}

/// BLAKE3 digest of the file at `path`, hex encoded.
pub async fn source_fingerprint(path: impl AsRef<Path>) -> Result<String, WriteError> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| WriteError::from_io(path, e))?;
    Ok(hex::encode(blake3::hash(&content).as_bytes()))
}

/// Reads and writes cache entries, routing every write through the serializer.
#[derive(Clone)]
pub struct CacheStore {
    deriver: CachePathDeriver,
    serializer: WriteSerializer,
    fingerprint: bool,
    /// One async lock per source identity, held across a fingerprinted write.
    /// Entries are dropped once no writer holds or awaits them.
    entry_locks: Arc<Mutex<HashMap<FileIdentity, Arc<tokio::sync::Mutex<()>>>>>,
}

impl CacheStore {
    pub fn new(deriver: CachePathDeriver, serializer: WriteSerializer, fingerprint: bool) -> Self {
        Self {
            deriver,
            serializer,
            fingerprint,
            entry_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &CacheConfig, serializer: WriteSerializer) -> Result<Self, WriteError> {
        Ok(Self::new(
            CachePathDeriver::from_config(config)?,
            serializer,
            config.fingerprint,
        ))
    }

    pub fn deriver(&self) -> &CachePathDeriver {
        &self.deriver
    }

    /// Read the cache entry for `source`.
    ///
    /// Returns `None` when no entry exists, or when fingerprinting is on and the
    /// recorded fingerprint does not match the source's current content.
    pub async fn read_cache(&self, source: impl AsRef<Path>) -> Result<Option<Vec<u8>>, WriteError> {
        let source = source.as_ref();
        let (cache_path, identity) = self.deriver.cache_path_for(source).await?;

        let Some(data) = read_optional(&cache_path).await? else {
            debug!(source = %source.display(), identity = %identity, "Cache miss");
            return Ok(None);
        };

        if self.fingerprint {
            let fingerprint_path = self.deriver.fingerprint_path_for_identity(&identity);
            let recorded = read_optional(&fingerprint_path).await?;
            let current = source_fingerprint(source).await?;
            if recorded.as_deref() != Some(current.as_bytes()) {
                debug!(
                    source = %source.display(),
                    identity = %identity,
                    "Cache entry stale, source content changed"
                );
                return Ok(None);
            }
        }

        Ok(Some(data))
    }

    /// Write `data` as the cache entry for `source` and wait for it to land.
    ///
    /// Writes are queued under the source's identity. With fingerprinting on,
    /// the fingerprint is cleared first and recorded only after the data write
    /// succeeds. Concurrent fingerprinted writes for one source run one at a
    /// time, so a failed write never leaves a valid-looking entry.
    pub async fn write_cache(
        &self,
        source: impl AsRef<Path>,
        data: impl Into<Payload>,
    ) -> Result<FileIdentity, WriteError> {
        let source = source.as_ref();
        let (cache_path, identity) = self.deriver.cache_path_for(source).await?;
        let cache_dir = self.deriver.cache_dir();
        tokio::fs::create_dir_all(cache_dir)
            .await
            .map_err(|e| WriteError::Io {
                path: cache_dir.to_path_buf(),
                source: e,
            })?;

        if !self.fingerprint {
            self.serializer
                .write_resolved(identity, &cache_path, data)
                .await?;
            return Ok(identity);
        }

        let lock = self.entry_lock(&identity);
        let result = {
            let _guard = lock.lock().await;
            self.write_fingerprinted(source, identity, &cache_path, data.into())
                .await
        };
        drop(lock);
        self.release_entry_lock(&identity);
        result?;

        debug!(source = %source.display(), identity = %identity, "Cache entry written");
        Ok(identity)
    }

    async fn write_fingerprinted(
        &self,
        source: &Path,
        identity: FileIdentity,
        cache_path: &Path,
        data: Payload,
    ) -> Result<(), WriteError> {
        let fingerprint_path = self.deriver.fingerprint_path_for_identity(&identity);
        let fingerprint = source_fingerprint(source).await?;
        self.serializer
            .write_resolved(identity, &fingerprint_path, "")
            .await?;
        self.serializer
            .write_resolved(identity, cache_path, data)
            .await?;
        self.serializer
            .write_resolved(identity, &fingerprint_path, fingerprint)
            .await
    }

    fn entry_lock(&self, identity: &FileIdentity) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.entry_locks.lock();
        Arc::clone(locks.entry(*identity).or_default())
    }

    fn release_entry_lock(&self, identity: &FileIdentity) {
        let mut locks = self.entry_locks.lock();
        if locks
            .get(identity)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(identity);
        }
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, WriteError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(WriteError::from_io(path, e)),
    }
}
