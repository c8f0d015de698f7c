//! CLI command implementations.

pub mod completions;
pub mod info;
pub mod install;
pub mod list;

use crate::settings::Settings;
use anyhow::{Context, Result};
use modvault_core::source::{LocalPackageSource, PackageSource};
use std::path::Path;

/// Build the local source from settings plus CLI override and run the
/// initial scan. Returns `None` when no repository is configured at all.
fn load_source(settings: &Settings, repo: Option<&Path>) -> Result<Option<LocalPackageSource>> {
    let Some(repository) = settings.repository_path(repo) else {
        return Ok(None);
    };
    tracing::debug!(repository = %repository.display(), "scanning package repository");
    let mut source = LocalPackageSource::new(repository);
    source
        .load_packages()
        .context("Failed to scan package repository")?;
    Ok(Some(source))
}
