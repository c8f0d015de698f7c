//! Resolved package records.
//!
//! [`PackageVersionInfo`] is the immutable per-archive record a source
//! registers; [`PackageGroupInfo`] aggregates all discovered versions of one
//! author+name family; [`PackageVersion`] is the dependency-graph node
//! whose identity is defined solely by its dependency id.

use crate::ident::{DependencyId, GroupId};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A node in a resolved dependency graph.
///
/// Equality and hashing are defined **solely** by `dependency_id`: two
/// nodes with the same id are the same entity regardless of any other
/// field. Collections of nodes therefore deduplicate by identity, which is
/// what keeps cyclic or diamond-shaped dependency walks finite.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    /// Version string of this node.
    pub version: String,
    /// Fully qualified id, when the node was resolved against a catalog.
    /// `None` for a dependency referenced but not discovered.
    pub dependency_id: Option<DependencyId>,
    /// The family this version belongs to.
    pub group_dependency_id: GroupId,
    /// Resolved child dependencies.
    pub dependencies: Vec<PackageVersion>,
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.dependency_id == other.dependency_id
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dependency_id.hash(state);
    }
}

/// An immutable resolved record pairing a version string with its
/// fully qualified id and dependency list. Produced once per discovered
/// archive and owned by the [`PackageGroupInfo`] that aggregates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersionInfo {
    version_number: String,
    dependency_id: DependencyId,
    group_dependency_id: GroupId,
    dependencies: Vec<DependencyId>,
    release_notes: String,
}

impl PackageVersionInfo {
    /// Build a resolved version record. The group id is supplied by the
    /// source that discovered the archive, since the derivation policy
    /// (filename parsing vs. id truncation) is a per-source concern.
    pub fn new(
        version_number: impl Into<String>,
        dependency_id: DependencyId,
        group_dependency_id: GroupId,
        dependencies: Vec<DependencyId>,
        release_notes: impl Into<String>,
    ) -> Self {
        Self {
            version_number: version_number.into(),
            dependency_id,
            group_dependency_id,
            dependencies,
            release_notes: release_notes.into(),
        }
    }

    /// Version string of this release.
    pub fn version_number(&self) -> &str {
        &self.version_number
    }

    /// Fully qualified identifier of this release.
    pub fn dependency_id(&self) -> &DependencyId {
        &self.dependency_id
    }

    /// The family key used to match this version back to its originating
    /// archive during install.
    pub fn group_dependency_id(&self) -> &GroupId {
        &self.group_dependency_id
    }

    /// Fully qualified ids of this version's dependencies.
    pub fn dependencies(&self) -> &[DependencyId] {
        &self.dependencies
    }

    /// Release notes, when the backing source carries any.
    pub fn release_notes(&self) -> &str {
        &self.release_notes
    }
}

/// The set of all discovered versions sharing one author+name identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroupInfo {
    author: String,
    name: String,
    description: String,
    dependency_id: GroupId,
    versions: Vec<PackageVersionInfo>,
}

impl PackageGroupInfo {
    /// Build a group. The key is always computed as `"{author}-{name}"`, so
    /// hand-assembled values cannot violate the join invariant.
    pub fn new(
        author: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        versions: Vec<PackageVersionInfo>,
    ) -> Self {
        let author = author.into();
        let name = name.into();
        let dependency_id = GroupId::from_author_name(&author, &name);
        Self {
            author,
            name,
            description: description.into(),
            dependency_id,
            versions,
        }
    }

    /// Author segment of the group identity.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Unqualified package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description taken from the most recently scanned manifest.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The `"{author}-{name}"` key this group is registered under.
    pub fn dependency_id(&self) -> &GroupId {
        &self.dependency_id
    }

    /// All discovered versions of this group.
    pub fn versions(&self) -> &[PackageVersionInfo] {
        &self.versions
    }

    /// Find one version by its fully qualified id.
    pub fn version(&self, id: &DependencyId) -> Option<&PackageVersionInfo> {
        self.versions.iter().find(|v| v.dependency_id() == id)
    }

    /// The highest version in the group, ordering by semantic version where
    /// both sides parse and falling back to lexicographic comparison.
    pub fn latest(&self) -> Option<&PackageVersionInfo> {
        self.versions
            .iter()
            .max_by(|a, b| compare_versions(a.version_number(), b.version_number()))
    }
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
