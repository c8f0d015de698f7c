//! The package source contract and its in-memory catalog.
//!
//! A source discovers package groups from some backing repository and
//! registers them into its [`Catalog`]. The trait splits the protocol the
//! way a remote implementation needs it split: backends implement the
//! scan/install hooks, while grouping, de-duplication, and the default
//! group-id derivation live in provided methods shared by every source.

mod local;

pub use local::{LocalPackageSource, SourceState};

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::archive::ArchiveError;
use modvault_schema::{DependencyId, GroupId, PackageGroupInfo, PackageVersion, PackageVersionInfo};

/// Errors fatal to a whole repository scan.
///
/// Per-archive failures are never surfaced here: a malformed or unreadable
/// archive is logged and skipped so its siblings still load.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The repository directory itself could not be enumerated.
    #[error("repository scan failed: {0}")]
    Io(#[from] io::Error),
}

/// Errors from a single install request.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No candidate archive's derived group id matched the requested
    /// version. The destination directory is left untouched.
    #[error("no archive provides package group '{group_id}'")]
    PackageNotFound {
        /// The group key that matched no archive.
        group_id: GroupId,
    },

    /// The matching archive could not be read or extracted.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// An I/O error occurred while preparing the destination.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// In-memory registry of discovered package groups, keyed by their
/// `"{author}-{name}"` id.
///
/// The owning source holds one catalog per load cycle; consumers only read
/// snapshots. Iteration order is deterministic (sorted by key).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    groups: BTreeMap<GroupId, PackageGroupInfo>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discovered group. A later registration under an equal key
    /// **replaces** the earlier one, never duplicates it, which is what
    /// makes repeated rescans idempotent (most recently scanned wins).
    pub fn add_package_group(&mut self, group: PackageGroupInfo) {
        self.groups.insert(group.dependency_id().clone(), group);
    }

    /// Look up a group by its key.
    pub fn get(&self, id: &GroupId) -> Option<&PackageGroupInfo> {
        self.groups.get(id)
    }

    /// Iterate all registered groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = &PackageGroupInfo> {
        self.groups.values()
    }

    /// Number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the catalog holds no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Find one resolved version by its fully qualified id.
    ///
    /// Tries the default group derivation first, then falls back to a full
    /// scan for sources whose archive naming defeats the last-hyphen rule.
    pub fn find_version(&self, id: &DependencyId) -> Option<&PackageVersionInfo> {
        if let Some(found) = self.get(&id.group_id()).and_then(|g| g.version(id)) {
            return Some(found);
        }
        self.groups().find_map(|group| group.version(id))
    }

    /// Resolve the dependency graph rooted at `version` against this
    /// catalog, breadth-first.
    ///
    /// Dependencies not present in the catalog become unresolved nodes
    /// (`dependency_id: None` children are not expanded further). Nodes
    /// deduplicate by dependency id, which keeps diamond-shaped or cyclic
    /// declarations finite.
    pub fn dependency_closure(&self, version: &PackageVersionInfo) -> Vec<PackageVersion> {
        let mut seen: HashSet<DependencyId> = HashSet::new();
        seen.insert(version.dependency_id().clone());

        let mut queue: Vec<DependencyId> = version.dependencies().to_vec();
        let mut closure = Vec::new();

        while !queue.is_empty() {
            let mut next = Vec::new();
            for id in queue {
                if !seen.insert(id.clone()) {
                    continue;
                }
                match self.find_version(&id) {
                    Some(dep) => {
                        next.extend(dep.dependencies().iter().cloned());
                        closure.push(PackageVersion {
                            version: dep.version_number().to_string(),
                            dependency_id: Some(dep.dependency_id().clone()),
                            group_dependency_id: dep.group_dependency_id().clone(),
                            dependencies: vec![],
                        });
                    }
                    None => closure.push(PackageVersion {
                        version: String::new(),
                        dependency_id: None,
                        group_dependency_id: id.group_id(),
                        dependencies: vec![],
                    }),
                }
            }
            queue = next;
        }

        closure
    }
}

/// The discovery/registration/install protocol any backing repository must
/// satisfy.
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// The family of sources this one belongs to (e.g. all mirrors of one
    /// upstream repository share a group).
    fn source_group(&self) -> &str;

    /// The catalog of groups discovered by the last load cycle.
    fn catalog(&self) -> &Catalog;

    /// Mutable access to the catalog, for registration during scans.
    fn catalog_mut(&mut self) -> &mut Catalog;

    /// Backend hook: perform one full scan of the backing repository,
    /// registering a group per discovered package.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] only when the scan cannot run at all;
    /// individual bad packages must be skipped, not propagated.
    fn on_load_packages(&mut self) -> Result<(), SourceError>;

    /// Backend hook: locate the originating package for `version` and
    /// extract its contents into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::PackageNotFound`] when no candidate matches
    /// the version's group key.
    fn on_install_package_files(
        &self,
        version: &PackageVersionInfo,
        dest: &Path,
    ) -> Result<(), InstallError>;

    /// Derive a group id from a fully qualified version id.
    ///
    /// The default strips everything from the last hyphen onward. Sources
    /// whose package naming carries no trailing version segment override
    /// this with their own parse rule.
    fn version_id_to_group_id(&self, dependency_id: &DependencyId) -> GroupId {
        dependency_id.group_id()
    }

    /// Register a discovered group into this source's catalog, keyed by
    /// its group id. An equally-keyed later registration replaces the
    /// earlier one.
    fn add_package_group(&mut self, group: PackageGroupInfo) {
        self.catalog_mut().add_package_group(group);
    }

    /// Look up one resolved version, deriving its group key with this
    /// source's id-parse policy first and falling back to a full catalog
    /// scan.
    fn find_version(&self, dependency_id: &DependencyId) -> Option<&PackageVersionInfo> {
        let group_id = self.version_id_to_group_id(dependency_id);
        if let Some(found) = self
            .catalog()
            .get(&group_id)
            .and_then(|g| g.version(dependency_id))
        {
            return Some(found);
        }
        self.catalog().find_version(dependency_id)
    }

    /// Trigger a full rescan. Safe to call repeatedly: same-key groups from
    /// later scans supersede earlier registrations, never duplicate them.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`SourceError`].
    fn load_packages(&mut self) -> Result<(), SourceError> {
        self.on_load_packages()?;
        tracing::info!(
            source = self.name(),
            groups = self.catalog().len(),
            "package catalog loaded"
        );
        Ok(())
    }

    /// Install one resolved version's files into `dest`.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`InstallError`].
    fn install_package_files(
        &self,
        version: &PackageVersionInfo,
        dest: &Path,
    ) -> Result<(), InstallError> {
        self.on_install_package_files(version, dest)
    }

    /// Fetch further listing pages from a paginated backend.
    ///
    /// Local sources are exhaustive after [`PackageSource::load_packages`],
    /// so the default completes immediately; callers may still await it
    /// before assuming the catalog is complete.
    ///
    /// # Errors
    ///
    /// Backend-specific; the default never fails.
    async fn reload_pages(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}
