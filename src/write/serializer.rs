//! Write Serializer
//!
//! Owns one FIFO queue per file identity. At most one write is in flight per
//! identity; the task that starts a queue drains it to empty and then removes
//! it from the registry.
//!
//! The serializer is a cheap, cloneable handle. Create one at startup and pass
//! it to whoever needs to write.

use super::backend::{FsBackend, WriteBackend};
use super::{CompletionFn, Payload, WriteRequest};
use crate::error::WriteError;
use crate::identity::{self, FileIdentity};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Called with a write failure that has no completion callback to receive it.
pub type FatalHandler = Arc<dyn Fn(&WriteError) + Send + Sync>;

/// Pending requests for one identity.
///
/// `in_flight` is set while the drain task owns the queue. The registry never
/// holds a queue that is idle and empty.
#[derive(Debug, Default)]
struct WriteQueue {
    pending: VecDeque<WriteRequest>,
    in_flight: bool,
}

struct Inner {
    queues: Mutex<HashMap<FileIdentity, WriteQueue>>,
    backend: Arc<dyn WriteBackend>,
    fatal: FatalHandler,
}

/// Per-identity write queue service.
#[derive(Clone)]
pub struct WriteSerializer {
    inner: Arc<Inner>,
}

impl WriteSerializer {
    /// Serializer writing through `tokio::fs`, aborting on unhandled failures.
    pub fn new() -> Self {
        Self::with_backend(Arc::new(FsBackend))
    }

    pub fn with_backend(backend: Arc<dyn WriteBackend>) -> Self {
        Self::with_fatal_handler(backend, Arc::new(abort_on_unhandled))
    }

    pub fn with_fatal_handler(backend: Arc<dyn WriteBackend>, fatal: FatalHandler) -> Self {
        Self {
            inner: Arc::new(Inner {
                queues: Mutex::new(HashMap::new()),
                backend,
                fatal,
            }),
        }
    }

    /// Queue a write of `payload` to `path`.
    ///
    /// Creates `path` empty if it does not exist, resolves its identity and
    /// enqueues the request. Ordering is fixed when this returns: a later
    /// submit against the same identity completes after this one.
    ///
    /// Errors returned here happened before the request was queued. Errors from
    /// the physical write go to `on_complete`; with no callback they are fatal.
    pub async fn submit(
        &self,
        path: impl AsRef<Path>,
        payload: impl Into<Payload>,
        on_complete: Option<CompletionFn>,
    ) -> Result<FileIdentity, WriteError> {
        let path = path.as_ref();
        ensure_exists(path).await?;
        let identity = identity::resolve(path).await?;
        self.enqueue(identity, path.to_path_buf(), payload.into(), on_complete);
        Ok(identity)
    }

    /// Queue a write against an identity the caller already resolved.
    ///
    /// Skips the status query. `path` is still created if missing.
    pub async fn submit_resolved(
        &self,
        identity: FileIdentity,
        path: impl AsRef<Path>,
        payload: impl Into<Payload>,
        on_complete: Option<CompletionFn>,
    ) -> Result<(), WriteError> {
        let path = path.as_ref();
        ensure_exists(path).await?;
        self.enqueue(identity, path.to_path_buf(), payload.into(), on_complete);
        Ok(())
    }

    /// Submit and wait for the write to finish.
    pub async fn write(
        &self,
        path: impl AsRef<Path>,
        payload: impl Into<Payload>,
    ) -> Result<(), WriteError> {
        let path = path.as_ref();
        let (tx, rx) = oneshot::channel();
        self.submit(path, payload, Some(reply_to(tx))).await?;
        await_reply(path, rx).await
    }

    /// [`write`](Self::write) for a pre-resolved identity.
    pub async fn write_resolved(
        &self,
        identity: FileIdentity,
        path: impl AsRef<Path>,
        payload: impl Into<Payload>,
    ) -> Result<(), WriteError> {
        let path = path.as_ref();
        let (tx, rx) = oneshot::channel();
        self.submit_resolved(identity, path, payload, Some(reply_to(tx)))
            .await?;
        await_reply(path, rx).await
    }

    /// Requests queued or in flight for `identity`.
    pub fn pending(&self, identity: &FileIdentity) -> usize {
        self.inner
            .queues
            .lock()
            .get(identity)
            .map(|q| q.pending.len() + usize::from(q.in_flight))
            .unwrap_or(0)
    }

    /// Number of identities with a live queue.
    pub fn active_queues(&self) -> usize {
        self.inner.queues.lock().len()
    }

    fn enqueue(
        &self,
        identity: FileIdentity,
        path: PathBuf,
        payload: Payload,
        on_complete: Option<CompletionFn>,
    ) {
        let request = WriteRequest {
            path,
            payload,
            on_complete,
        };

        let start_drain = {
            let mut queues = self.inner.queues.lock();
            let queue = queues.entry(identity).or_default();
            debug!(
                identity = %identity,
                path = %request.path.display(),
                bytes = request.payload.len(),
                queued = queue.pending.len(),
                in_flight = queue.in_flight,
                "Enqueued write request"
            );
            queue.pending.push_back(request);
            !std::mem::replace(&mut queue.in_flight, true)
        };

        if start_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                drain(inner, identity).await;
            });
        }
    }
}

impl Default for WriteSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write queued requests for `identity` one at a time until none remain.
///
/// Each request's callback runs before the next write starts. The queue is
/// removed under the same lock that observes it empty, so a concurrent
/// enqueue either lands before removal (and is drained here) or after it
/// (and starts a fresh drain).
async fn drain(inner: Arc<Inner>, identity: FileIdentity) {
    let mut completed = 0usize;
    let mut failed = 0usize;

    loop {
        let next = {
            let mut queues = inner.queues.lock();
            match queues.get_mut(&identity) {
                Some(queue) => match queue.pending.pop_front() {
                    Some(request) => Some(request),
                    None => {
                        queues.remove(&identity);
                        None
                    }
                },
                None => None,
            }
        };
        let Some(request) = next else {
            break;
        };

        debug!(
            identity = %identity,
            path = %request.path.display(),
            bytes = request.payload.len(),
            "Starting write"
        );
        let result = inner
            .backend
            .write(&request.path, request.payload.as_bytes())
            .await
            .map_err(|e| WriteError::Io {
                path: request.path.clone(),
                source: e,
            });

        match (result, request.on_complete) {
            (Ok(()), on_complete) => {
                completed += 1;
                if let Some(cb) = on_complete {
                    run_callback(identity, cb, Ok(()));
                }
            }
            (Err(e), Some(cb)) => {
                failed += 1;
                warn!(identity = %identity, error = %e, "Write failed");
                run_callback(identity, cb, Err(e));
            }
            (Err(e), None) => {
                failed += 1;
                error!(
                    identity = %identity,
                    error = %e,
                    "Write failed with no completion callback"
                );
                (inner.fatal)(&e);
            }
        }
    }

    info!(identity = %identity, completed, failed, "Write queue drained");
}

/// Invoke a completion callback, containing any panic so the queue keeps draining.
fn run_callback(identity: FileIdentity, cb: CompletionFn, result: Result<(), WriteError>) {
    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(move || cb(result))) {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(identity = %identity, panic = %message, "Completion callback panicked");
    }
}

async fn ensure_exists(path: &Path) -> Result<(), WriteError> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Creating missing file before write");
            tokio::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .open(path)
                .await
                .map(|_| ())
                .map_err(|e| WriteError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
        }
        Err(e) => Err(WriteError::from_io(path, e)),
    }
}

fn reply_to(tx: oneshot::Sender<Result<(), WriteError>>) -> CompletionFn {
    Box::new(move |result| {
        let _ = tx.send(result);
    })
}

async fn await_reply(
    path: &Path,
    rx: oneshot::Receiver<Result<(), WriteError>>,
) -> Result<(), WriteError> {
    rx.await.map_err(|_| WriteError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "write task ended before reporting completion",
        ),
    })?
}

fn abort_on_unhandled(err: &WriteError) {
    error!(error = %err, "Unhandled write failure, aborting process");
    eprintln!("safewrite: unhandled write failure: {}", err);
    std::process::abort();
}
