//! Safewrite: identity-keyed safe file writes
//!
//! Serializes concurrent writes to the same physical file. Paths are resolved
//! to a durable filesystem identity (device and inode), writes are queued FIFO
//! per identity, and each request reports completion or failure. A companion
//! cache layer names cache files after the identity of their source.

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod tooling;
pub mod write;

pub use cache::{CachePathDeriver, CacheStore};
pub use error::WriteError;
pub use identity::{resolve, FileIdentity};
pub use write::{CompletionFn, Payload, WriteSerializer};
