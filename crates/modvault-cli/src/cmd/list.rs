use anyhow::Result;
use std::path::Path;

use crate::settings::Settings;
use modvault_core::source::PackageSource;

/// List package groups discovered in the repository.
pub fn list(repo: Option<&Path>) -> Result<()> {
    let settings = Settings::load()?;
    let Some(source) = super::load_source(&settings, repo)? else {
        println!();
        println!("  No repository configured.");
        println!("  Pass --repo <dir> or set repository_path in config.toml.");
        return Ok(());
    };

    let catalog = source.catalog();
    if catalog.is_empty() {
        println!();
        println!("  No packages found in the repository.");
        return Ok(());
    }

    println!();
    for group in catalog.groups() {
        let version = group.latest().map_or("?", |v| v.version_number());
        println!("  {:<40} {version}", group.dependency_id().as_str());
    }
    println!();
    println!("  {} package group(s)", catalog.len());

    Ok(())
}
