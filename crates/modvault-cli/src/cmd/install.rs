//! Install command

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::settings::Settings;
use modvault_core::source::PackageSource;
use modvault_schema::{DependencyId, GroupId, PackageVersionInfo};

/// Extract a package version into a destination directory.
///
/// `package` is either a fully qualified dependency id
/// (`author-name-version`) or a group id, in which case the group's latest
/// version is installed.
pub async fn install(package: &str, dest: Option<PathBuf>, repo: Option<&Path>) -> Result<()> {
    let settings = Settings::load()?;
    let Some(mut source) = super::load_source(&settings, repo)? else {
        bail!("No repository configured. Pass --repo <dir> or set repository_path in config.toml.");
    };

    // For a paginated source this would fetch the remaining listing pages;
    // the local source is already exhaustive and completes immediately.
    source.reload_pages().await?;

    let version = resolve_version(&source, package)?.clone();
    let group_id = version.group_dependency_id().clone();

    let dest = dest.unwrap_or_else(|| settings.install_dir().join(group_id.as_str()));

    source
        .install_package_files(&version, &dest)
        .with_context(|| format!("Failed to install '{}'", version.dependency_id()))?;

    println!(
        "Installed {group_id} {} to {}",
        version.version_number(),
        dest.display()
    );
    Ok(())
}

fn resolve_version<'a>(
    source: &'a impl PackageSource,
    package: &str,
) -> Result<&'a PackageVersionInfo> {
    if let Some(version) = source.find_version(&DependencyId::new(package)) {
        return Ok(version);
    }
    if let Some(group) = source.catalog().get(&GroupId::new(package)) {
        return group
            .latest()
            .with_context(|| format!("Package group '{package}' has no versions"));
    }
    bail!("Package '{package}' not found in the repository");
}
