//! Dirsync - directory authentication and user synchronization
//!
//! Verifies a credential against an LDAP/Active Directory server and pulls
//! the user records of a directory subtree.

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use commands::CommandContext;
use dirsync_core::DirsyncConfig;
use std::future::Future;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dirsync")]
#[command(author = "Dirsync Team")]
#[command(version = dirsync_core::VERSION)]
#[command(about = "Directory authentication and user synchronization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DIRSYNC_CONFIG")]
    config: Option<String>,

    /// Directory server host or ldap:// URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Directory server port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Domain used to qualify the username
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Account name
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Account password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Wait for Enter before exiting
    #[arg(long, global = true)]
    pause: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DIRSYNC_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the credential and look up the account
    Auth,

    /// Synchronize users from the configured subtree
    Sync {
        /// Print each user as soon as it is mapped
        #[arg(long)]
        stream: bool,

        /// Skip entries that cannot be mapped instead of aborting
        #[arg(long)]
        skip_unmappable: bool,
    },

    /// Authenticate, then synchronize (default)
    Run,

    /// Validate and show the resolved configuration
    CheckConfig,

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load config: file first, then environment, then CLI args
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = DirsyncConfig::from_file(path)?;
            config.apply_env();
            config
        }
        None => DirsyncConfig::from_env(),
    };

    if let Some(server) = cli.server {
        config.directory.server = server;
    }
    if let Some(port) = cli.port {
        config.directory.port = Some(port);
    }
    if let Some(domain) = cli.domain {
        config.credentials.domain = domain;
    }
    if let Some(username) = cli.username {
        config.credentials.username = username;
    }
    if let Some(password) = cli.password {
        config.credentials.password = password;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Initialize logging on stderr; stdout carries records
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();

    let ctx = CommandContext {
        config,
        output_format: cli.output,
    };

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Auth => commands::auth::execute(&ctx).await,
        Commands::Sync {
            stream,
            skip_unmappable,
        } => commands::sync::execute(&ctx, stream, skip_unmappable).await,
        Commands::Run => run_all(&ctx).await,
        Commands::CheckConfig => commands::check::execute(&ctx),
        Commands::Version => {
            println!("dirsync {}", dirsync_core::VERSION);
            Ok(true)
        }
    };

    if cli.pause {
        wait_for_enter()?;
    }

    if !result? {
        anyhow::bail!("One or more directory operations failed");
    }

    Ok(())
}

/// Authentication and synchronization run independently of each other
async fn run_all(ctx: &CommandContext) -> anyhow::Result<bool> {
    Ok(run_independently(
        commands::auth::execute(ctx),
        commands::sync::execute(ctx, false, false),
    )
    .await)
}

/// Await both operations in order; an error in the first never skips the second
async fn run_independently<A, S>(auth: A, sync: S) -> bool
where
    A: Future<Output = anyhow::Result<bool>>,
    S: Future<Output = anyhow::Result<bool>>,
{
    let authenticated = auth.await.unwrap_or_else(|e| {
        tracing::error!("Authentication could not run: {:#}", e);
        false
    });
    let synced = sync.await.unwrap_or_else(|e| {
        tracing::error!("Synchronization could not run: {:#}", e);
        false
    });

    authenticated && synced
}

fn wait_for_enter() -> anyhow::Result<()> {
    print!("Press Enter to exit...");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
