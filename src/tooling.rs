//! Tooling
//!
//! Command-line entry points over the safe-write API.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
