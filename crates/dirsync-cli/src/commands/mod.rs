//! CLI command implementations

pub mod auth;
pub mod check;
pub mod sync;

use crate::OutputFormat;
use dirsync_core::DirsyncConfig;

/// Context passed to all commands
pub struct CommandContext {
    pub config: DirsyncConfig,
    pub output_format: OutputFormat,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print a status message in text mode
    pub fn info(&self, msg: &str) {
        if !self.is_json() {
            println!("{}", msg);
        }
    }
}
