//! Dirsync Core Library
//!
//! Configuration, error and record types shared by the directory client and
//! the command-line tool.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::DirsyncConfig;
pub use error::{Error, Result};

/// Dirsync version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
