//! Local-directory package source.
//!
//! Scans a flat folder of zip archives named `"{author}-{anything}.zip"`,
//! pulls each archive's `manifest.json` out without a full extraction, and
//! registers one group per archive keyed by `"{author}-{manifest.name}"`.
//! Installs re-scan the directory so they always reflect its current
//! contents, a deliberate freshness-over-performance tradeoff.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Catalog, InstallError, PackageSource, SourceError};
use crate::archive::PackageArchive;
use modvault_schema::{DependencyId, GroupId, Manifest, PackageGroupInfo, PackageVersionInfo};

/// Entry name looked up inside each archive.
const MANIFEST_ENTRY: &str = "manifest.json";

/// Archive extension this source recognizes.
const ARCHIVE_EXTENSION: &str = "zip";

/// Lifecycle state of a [`LocalPackageSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Not attached; the catalog is empty and scans are not running.
    Disabled,
    /// A scan is in progress against a half-populated catalog.
    Scanning,
    /// The last scan completed; the catalog is exhaustive.
    Ready,
}

/// A package source backed by a flat local directory of zip archives.
#[derive(Debug)]
pub struct LocalPackageSource {
    repository_path: Option<PathBuf>,
    state: SourceState,
    catalog: Catalog,
}

impl LocalPackageSource {
    /// Create a source over the given repository directory. The source
    /// starts [`SourceState::Disabled`]; call [`LocalPackageSource::attach`]
    /// or [`PackageSource::load_packages`] to populate it.
    pub fn new(repository_path: impl Into<PathBuf>) -> Self {
        Self {
            repository_path: Some(repository_path.into()),
            state: SourceState::Disabled,
            catalog: Catalog::new(),
        }
    }

    /// Create a source with no repository configured. Scans succeed and
    /// yield an empty catalog.
    pub fn unconfigured() -> Self {
        Self {
            repository_path: None,
            state: SourceState::Disabled,
            catalog: Catalog::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// The configured repository directory, if any.
    pub fn repository_path(&self) -> Option<&Path> {
        self.repository_path.as_deref()
    }

    /// Attach this source to its host: performs the initial load exactly
    /// once. Calling `attach` on an already-attached source is a no-op, so
    /// repeated enable cycles never double-register.
    ///
    /// # Errors
    ///
    /// Propagates a scan failure from the initial load.
    pub fn attach(&mut self) -> Result<(), SourceError> {
        if self.state != SourceState::Disabled {
            return Ok(());
        }
        self.load_packages()
    }

    /// Detach from the host: clears the catalog and returns to
    /// [`SourceState::Disabled`]. A later [`LocalPackageSource::attach`]
    /// starts a fresh load cycle.
    pub fn detach(&mut self) {
        self.catalog.clear();
        self.state = SourceState::Disabled;
    }

    /// List candidate archives directly inside the repository path, sorted
    /// lexicographically for deterministic scan and install order. No
    /// recursion into subdirectories. A missing or unconfigured path yields
    /// an empty list, not an error.
    fn archive_paths(&self) -> io::Result<Vec<PathBuf>> {
        let Some(root) = self.repository_path.as_deref() else {
            debug!("no repository path configured, treating as empty");
            return Ok(Vec::new());
        };
        if !root.is_dir() {
            debug!(path = %root.display(), "repository path absent, treating as empty");
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            let is_archive = path.is_file()
                && path
                    .extension()
                    .and_then(OsStr::to_str)
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION));
            if is_archive {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Read one archive's manifest and derive its group identity.
    ///
    /// Returns `Ok(None)` when the archive has no `manifest.json` entry.
    /// The handle is dropped on return, so scans hold one archive open at
    /// a time.
    fn scan_archive(path: &Path) -> anyhow::Result<Option<PackageGroupInfo>> {
        let mut archive = PackageArchive::open(path)?;
        let Some(bytes) = archive.read_entry_named(MANIFEST_ENTRY)? else {
            return Ok(None);
        };
        let manifest = Manifest::from_slice(&bytes)
            .with_context(|| format!("invalid {MANIFEST_ENTRY} in {}", path.display()))?;

        let version_id = file_stem(path);
        let author = author_segment(version_id);
        let group_id = GroupId::from_author_name(author, &manifest.name);

        let version = PackageVersionInfo::new(
            manifest.version_number,
            DependencyId::new(version_id),
            group_id,
            manifest.dependencies,
            "",
        );

        Ok(Some(PackageGroupInfo::new(
            author,
            manifest.name,
            manifest.description,
            vec![version],
        )))
    }

    /// Recompute one archive's group id from its on-disk state, for the
    /// install-time match. Any per-archive failure is reported as `None` so
    /// the caller can skip and continue.
    fn archive_group_id(path: &Path) -> Option<GroupId> {
        let result = (|| -> anyhow::Result<Option<GroupId>> {
            let mut archive = PackageArchive::open(path)?;
            let Some(bytes) = archive.read_entry_named(MANIFEST_ENTRY)? else {
                return Ok(None);
            };
            let manifest = Manifest::from_slice(&bytes)?;
            let author = author_segment(file_stem(path));
            Ok(Some(GroupId::from_author_name(author, &manifest.name)))
        })();

        match result {
            Ok(group_id) => group_id,
            Err(err) => {
                warn!(archive = %path.display(), error = %err, "skipping unreadable archive");
                None
            }
        }
    }
}

#[async_trait]
impl PackageSource for LocalPackageSource {
    fn name(&self) -> &str {
        "Local Repository"
    }

    fn source_group(&self) -> &str {
        "Local"
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    fn on_load_packages(&mut self) -> Result<(), SourceError> {
        self.state = SourceState::Scanning;
        let result = (|| -> Result<(), SourceError> {
            for path in self.archive_paths()? {
                match Self::scan_archive(&path) {
                    Ok(Some(group)) => self.add_package_group(group),
                    Ok(None) => {
                        warn!(archive = %path.display(), "no {MANIFEST_ENTRY} entry, skipping");
                    }
                    Err(err) => {
                        warn!(archive = %path.display(), error = %err, "skipping unreadable archive");
                    }
                }
            }
            Ok(())
        })();
        self.state = SourceState::Ready;
        result
    }

    fn on_install_package_files(
        &self,
        version: &PackageVersionInfo,
        dest: &Path,
    ) -> Result<(), InstallError> {
        let target = version.group_dependency_id();

        // Always re-read manifests from disk rather than trusting the
        // catalog: the directory may have changed since the last scan.
        for path in self.archive_paths()? {
            if Self::archive_group_id(&path).as_ref() != Some(target) {
                continue;
            }

            debug!(
                archive = %path.display(),
                dest = %dest.display(),
                "installing package files"
            );
            fs::create_dir_all(dest)?;
            let mut archive = PackageArchive::open(&path)?;
            archive.unpack(dest)?;
            // Archives are assumed uniquely keyed by group id; with
            // duplicates, the first match in sorted order wins.
            return Ok(());
        }

        Err(InstallError::PackageNotFound {
            group_id: target.clone(),
        })
    }
}

/// Filename without the archive extension.
fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(OsStr::to_str).unwrap_or_default()
}

/// The substring of an archive's file stem before the first hyphen. Only
/// this segment of the filename is semantically significant (author
/// identity); the remainder is never parsed.
fn author_segment(stem: &str) -> &str {
    stem.split('-').next().unwrap_or(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_is_first_hyphen_segment() {
        assert_eq!(author_segment("alice-foo-1.0.0"), "alice");
        assert_eq!(author_segment("alice"), "alice");
        assert_eq!(author_segment(""), "");
    }

    #[test]
    fn unconfigured_source_loads_empty() {
        let mut source = LocalPackageSource::unconfigured();
        source.load_packages().unwrap();
        assert!(source.catalog().is_empty());
        assert_eq!(source.state(), SourceState::Ready);
    }

    #[test]
    fn absent_repository_path_is_not_an_error() {
        let mut source = LocalPackageSource::new("/definitely/not/a/real/path");
        source.load_packages().unwrap();
        assert!(source.catalog().is_empty());
    }

    #[test]
    fn attach_loads_once_and_detach_resets() {
        let mut source = LocalPackageSource::unconfigured();
        assert_eq!(source.state(), SourceState::Disabled);

        source.attach().unwrap();
        assert_eq!(source.state(), SourceState::Ready);

        // Second attach is a no-op, not a second subscription.
        source.attach().unwrap();
        assert_eq!(source.state(), SourceState::Ready);

        source.detach();
        assert_eq!(source.state(), SourceState::Disabled);
        assert!(source.catalog().is_empty());
    }
}
