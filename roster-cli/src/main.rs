//! Roster: replay and inspect list reconciliation from the command line.
//!
//! # Usage
//!
//! ```text
//! roster replay <script.yaml> [--json]
//! roster diff <current.json> <target.json> [--json]
//! ```
//!
//! Logging goes to stderr and is controlled through `RUST_LOG`
//! (default `warn`; `RUST_LOG=roster_core=debug` shows silent drops).

mod commands;
mod output;
mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, replay::ReplayArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    version,
    about = "Replay reconciliation scripts against an ordered item list",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script of list operations and print every change notification.
    Replay(ReplayArgs),

    /// Show what patching a current sequence with a target would change.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Replay(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
