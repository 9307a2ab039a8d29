//! Safe Writes
//!
//! Serializes writes to the same physical file. Requests are keyed by
//! [`FileIdentity`](crate::identity::FileIdentity), queued FIFO per identity,
//! and executed one at a time per identity. Distinct identities drain
//! independently.

pub mod backend;
pub mod serializer;

pub use backend::{FsBackend, WriteBackend};
pub use serializer::{FatalHandler, WriteSerializer};

use crate::error::WriteError;
use std::path::PathBuf;

/// Completion callback invoked once a request's write attempt finishes.
pub type CompletionFn = Box<dyn FnOnce(Result<(), WriteError>) + Send + 'static>;

/// Data to write. Text is encoded as UTF-8; both variants share one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

/// One pending write in an identity's queue.
///
/// The drain task pops a request before writing it; the queue's `in_flight`
/// flag stays set until that request's callback has returned.
pub(crate) struct WriteRequest {
    pub(crate) path: PathBuf,
    pub(crate) payload: Payload,
    pub(crate) on_complete: Option<CompletionFn>,
}

impl std::fmt::Debug for WriteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteRequest")
            .field("path", &self.path)
            .field("payload_len", &self.payload.len())
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_bytes_encode_identically() {
        let text = Payload::from("héllo");
        let bytes = Payload::from("héllo".as_bytes());
        assert_eq!(text.as_bytes(), bytes.as_bytes());
        assert_eq!(text.len(), 6);
        assert_ne!(text, bytes);
    }

    #[test]
    fn test_empty_payload() {
        assert!(Payload::from(Vec::new()).is_empty());
        assert!(!Payload::from("x").is_empty());
    }
}
