//! Info command

use anyhow::{Result, bail};
use std::path::Path;

use crate::settings::Settings;
use modvault_core::source::PackageSource;
use modvault_schema::{DependencyId, GroupId};

/// Show one package group's versions and dependencies.
pub fn info(package: &str, repo: Option<&Path>) -> Result<()> {
    let settings = Settings::load()?;
    let Some(source) = super::load_source(&settings, repo)? else {
        bail!("No repository configured. Pass --repo <dir> or set repository_path in config.toml.");
    };
    let catalog = source.catalog();

    // Accept either a group id or a fully qualified version id.
    let group = catalog
        .get(&GroupId::new(package))
        .or_else(|| {
            catalog
                .find_version(&DependencyId::new(package))
                .and_then(|v| catalog.get(v.group_dependency_id()))
        });
    let Some(group) = group else {
        bail!("Package '{package}' not found in the repository");
    };

    let lw = 14;

    println!();
    println!("  {}", group.dependency_id());
    if !group.description().is_empty() {
        println!("  {}", group.description());
    }
    println!();
    println!("  {:<lw$}{}", "author", group.author());
    println!("  {:<lw$}{}", "name", group.name());

    for version in group.versions() {
        println!();
        println!("  {:<lw$}{}", "version", version.version_number());
        println!("  {:<lw$}{}", "id", version.dependency_id());

        let closure = catalog.dependency_closure(version);
        if !closure.is_empty() {
            let rendered: Vec<String> = closure
                .iter()
                .map(|node| match &node.dependency_id {
                    Some(id) => id.to_string(),
                    None => format!("{} (not in repository)", node.group_dependency_id),
                })
                .collect();
            println!("  {:<lw$}{}", "requires", rendered.join(", "));
        }
    }
    println!();

    Ok(())
}
