//! Package identifier newtypes.
//!
//! A [`DependencyId`] names one specific package version
//! (`"author-name-1.2.3"`); a [`GroupId`] names the package family across
//! versions (`"author-name"`). Keeping them as distinct types prevents a
//! version-qualified id from being used where a family key is expected, and
//! makes the identity-by-id equality of the resolved records explicit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified identifier of one specific package version.
///
/// # Example
///
/// ```
/// use modvault_schema::ident::DependencyId;
///
/// let id = DependencyId::new("acme-supermod-1.0.0");
/// assert_eq!(id.group_id().as_str(), "acme-supermod");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyId(String);

impl DependencyId {
    /// Create a new `DependencyId` from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the owning group id under the default policy: everything from
    /// the last hyphen onward is the version segment and is stripped.
    ///
    /// `"acme-supermod-1.0.0"` becomes `"acme-supermod"`, and
    /// `"acme-supermod-1.0.0-rc1"` becomes `"acme-supermod-1.0.0"`. An id
    /// with no hyphen has no version segment to strip and is returned whole.
    pub fn group_id(&self) -> GroupId {
        match self.0.rfind('-') {
            Some(idx) => GroupId(self.0[..idx].to_string()),
            None => GroupId(self.0.clone()),
        }
    }
}

impl From<&str> for DependencyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DependencyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a package family (all versions sharing one author+name).
///
/// Always the concatenation of author and package name with a separating
/// hyphen; [`GroupId::from_author_name`] is the canonical constructor and
/// the join key used to match a resolved version back to its originating
/// archive during install.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Create a `GroupId` from a raw string that is already in
    /// `"author-name"` form.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Build the canonical `"{author}-{name}"` key.
    pub fn from_author_name(author: &str, name: &str) -> Self {
        Self(format!("{author}-{name}"))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The truncation rule is "strip from the last hyphen", not "strip a
    // semver suffix". These literal fixtures pin the difference.
    #[test]
    fn group_id_strips_last_hyphen_segment() {
        let id = DependencyId::new("acme-supermod-1.0.0");
        assert_eq!(id.group_id().as_str(), "acme-supermod");
    }

    #[test]
    fn group_id_keeps_hyphenated_version_prefix() {
        let id = DependencyId::new("acme-supermod-1.0.0-rc1");
        assert_eq!(id.group_id().as_str(), "acme-supermod-1.0.0");
    }

    #[test]
    fn group_id_of_unhyphenated_id_is_identity() {
        let id = DependencyId::new("supermod");
        assert_eq!(id.group_id().as_str(), "supermod");
    }

    #[test]
    fn from_author_name_joins_with_hyphen() {
        let group = GroupId::from_author_name("alice", "foo");
        assert_eq!(group.as_str(), "alice-foo");
        assert_eq!(group, GroupId::new("alice-foo"));
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = DependencyId::new("alice-foo-1.2.3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice-foo-1.2.3\"");
        let back: DependencyId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
