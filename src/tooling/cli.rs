//! CLI Tooling
//!
//! Maintenance command-line interface over the safe-write API: inspect file
//! identities and cache locations, and push writes through the serializer.

use crate::cache::CacheStore;
use crate::config::{ConfigLoader, SafeWriteConfig};
use crate::error::WriteError;
use crate::identity;
use crate::write::{Payload, WriteSerializer};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Safewrite CLI - identity-keyed safe file writes
#[derive(Parser)]
#[command(name = "safewrite")]
#[command(about = "Serialized file writes keyed by durable file identity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Load configuration and fold logging flags into it.
    pub fn resolve_config(&self) -> Result<SafeWriteConfig, WriteError> {
        let mut config = ConfigLoader::load_or_default_sources(self.config.as_deref())?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if self.log_file.is_some() {
            config.logging.file = self.log_file.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the durable identity of a file
    Identity {
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the cache file path derived from a source file
    CachePath {
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write data to a file through the serializer and wait for completion
    Write {
        path: PathBuf,
        /// Data to write, or a path to read it from with --from-file
        data: String,
        /// Treat DATA as a file whose bytes are written
        #[arg(long)]
        from_file: bool,
    },
    /// Print the cache entry for a source file
    CacheRead { path: PathBuf },
    /// Store a cache entry for a source file
    CacheWrite { path: PathBuf, data: String },
}

/// CLI execution context
pub struct CliContext {
    serializer: WriteSerializer,
    cache: CacheStore,
}

impl CliContext {
    pub fn new(config: &SafeWriteConfig) -> Result<Self, WriteError> {
        let serializer = WriteSerializer::new();
        let cache = CacheStore::from_config(&config.cache, serializer.clone())?;
        Ok(Self { serializer, cache })
    }

    pub fn serializer(&self) -> &WriteSerializer {
        &self.serializer
    }

    /// Execute a command, returning its printable output.
    pub async fn execute(&self, command: &Commands) -> Result<String, WriteError> {
        match command {
            Commands::Identity { path, format } => {
                let id = identity::resolve(path).await?;
                Ok(match format.as_str() {
                    "json" => json!({
                        "path": path,
                        "identity": id.to_string(),
                        "device": id.device(),
                        "inode": id.inode(),
                    })
                    .to_string(),
                    _ => id.to_string(),
                })
            }
            Commands::CachePath { path, format } => {
                let (cache_path, id) = self.cache.deriver().cache_path_for(path).await?;
                Ok(match format.as_str() {
                    "json" => json!({
                        "source": path,
                        "identity": id.to_string(),
                        "cache_path": cache_path,
                    })
                    .to_string(),
                    _ => format!("{}\t{}", cache_path.display(), id),
                })
            }
            Commands::Write {
                path,
                data,
                from_file,
            } => {
                let payload = if *from_file {
                    let bytes = tokio::fs::read(data)
                        .await
                        .map_err(|e| WriteError::from_io(data, e))?;
                    Payload::Bytes(bytes)
                } else {
                    Payload::Text(data.clone())
                };
                let bytes = payload.len();
                self.serializer.write(path, payload).await?;
                info!(path = %path.display(), bytes, "Write completed");
                Ok(format!("Wrote {} bytes to {}", bytes, path.display()))
            }
            Commands::CacheRead { path } => match self.cache.read_cache(path).await? {
                Some(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
                None => Ok(String::new()),
            },
            Commands::CacheWrite { path, data } => {
                let id = self.cache.write_cache(path, data.as_str()).await?;
                let cache_path = self.cache.deriver().cache_path_for_identity(&id);
                Ok(format!("Cached {} at {}", path.display(), cache_path.display()))
            }
        }
    }
}
