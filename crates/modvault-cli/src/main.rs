//! modvault - local mod-package repository CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use modvault_cli::cmd;
use modvault_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let repo = cli.repo.as_deref();

    match cli.command {
        Commands::List => cmd::list::list(repo),
        Commands::Info { package } => cmd::info::info(&package, repo),
        Commands::Install { package, dest } => cmd::install::install(&package, dest, repo).await,
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
