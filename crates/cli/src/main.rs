//! vApteke CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations for the primary customer store
//! vapteke-cli migrate
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vapteke-cli")]
#[command(author, version, about = "vApteke customers service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations against the primary customer store
    Migrate,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
    }
    Ok(())
}
