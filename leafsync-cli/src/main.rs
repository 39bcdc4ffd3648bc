//! leafsync — mirror remote LaTeX projects into a local directory tree.
//!
//! # Usage
//!
//! ```text
//! leafsync sync [--config <path>] [--downloads-path <dir>] [--project <id|name>]...
//!               [--tag <tag>]... [--accept-invites] [--force-download]
//!               [--force-write-last-run] [--dry-run] [--strict]
//! leafsync status [--downloads-path <dir>] [--json]
//! ```

mod commands;
mod http;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "leafsync",
    version,
    about = "One-way sync of remote LaTeX projects into a local directory",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download selected projects, replacing their local directories.
    Sync(SyncArgs),

    /// Show the last run and the project directories present locally.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
