//! sync command - pull users from the directory subtree

use super::CommandContext;
use crate::output::ConsoleSink;
use anyhow::Result;
use colored::Colorize;
use dirsync_core::config::{EmitMode, UnmappablePolicy};
use dirsync_ldap::{DirectorySynchronizer, Ldap3Connector};

/// Returns whether the synchronization completed
pub async fn execute(ctx: &CommandContext, stream: bool, skip_unmappable: bool) -> Result<bool> {
    let config = &ctx.config;
    config.validate()?;

    let mut sync_config = config.sync.clone();
    if stream {
        sync_config.emit = EmitMode::Streaming;
    }
    if skip_unmappable {
        sync_config.on_unmappable = UnmappablePolicy::Skip;
    }
    sync_config.validate()?;

    let synchronizer = DirectorySynchronizer::new(
        Ldap3Connector::new(config.directory.clone()),
        config.directory.bind_format,
        sync_config,
    );

    let mut sink = ConsoleSink::new(ctx.output_format);
    match synchronizer.sync_users(&config.credential(), &mut sink).await {
        Ok(report) => {
            let mut summary = format!("Synchronized {} users", report.users.len());
            if report.skipped > 0 {
                summary.push_str(&format!(" ({} skipped)", report.skipped));
            }
            ctx.info(&summary.green().to_string());
            Ok(true)
        }
        Err(e) => {
            if ctx.is_json() {
                eprintln!("{}", serde_json::json!({ "error": e.to_string(), "code": e.code() }));
            } else {
                eprintln!("{} {}", "Synchronization failed:".red().bold(), e);
            }
            Ok(false)
        }
    }
}
