//! Simtrack operations CLI.
//!
//! Two jobs: provision the document store (one least-privilege role and
//! user per collection) and seed a development database with test data.
//! Everything else goes through the portal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use simtrack_core::tracing_init::init_tracing;

mod init_db;
mod populate;

#[derive(Parser, Debug)]
#[command(name = "simtrack")]
#[command(version, about = "Simtrack store provisioning and seeding", long_about = None)]
struct Cli {
    /// Path to a settings.json overriding the global config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create per-collection roles and least-privilege users
    InitDb(init_db::InitDbArgs),
    /// Seed a development store from a JSON data file
    Populate(populate::PopulateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("simtrack=info", cli.log_json);

    match cli.command {
        Command::InitDb(args) => init_db::run(args).await,
        Command::Populate(args) => populate::run(cli.config.as_deref(), args).await,
    }
}
