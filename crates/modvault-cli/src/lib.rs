//! modvault - local mod-package repositories
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command-line front-end over the local package source: scan a directory
//! of zip-packaged mods, inspect the discovered groups and versions, and
//! extract one version into an install directory.

pub mod cmd;
pub mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modvault")]
#[command(author, version, about = "modvault - manage local mod-package repositories")]
pub struct Cli {
    /// Repository directory holding packaged mods (overrides the settings file)
    #[arg(long, global = true, env = "MODVAULT_REPO")]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List package groups discovered in the repository
    List,
    /// Show one package group's versions and dependencies
    Info {
        /// Group id ("author-name") or fully qualified dependency id
        package: String,
    },
    /// Extract a package version into a destination directory
    Install {
        /// Fully qualified dependency id (author-name-version) or group id
        package: String,
        /// Destination directory (defaults to <install-dir>/<group-id>)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
