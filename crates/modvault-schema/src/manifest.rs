//! Archive-embedded package manifest parsing.
//!
//! Every package archive carries a `manifest.json` (UTF-8 JSON object)
//! declaring the package's name, version, and fully qualified dependency
//! ids. The schema mirrors the widely used mod-package manifest convention,
//! so unknown fields are tolerated and optional fields default to empty.

use crate::ident::DependencyId;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Errors that can occur when reading or parsing a package manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// An I/O error occurred while reading the manifest bytes.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The JSON content could not be deserialized into a valid manifest.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A package's declared identity, parsed from its `manifest.json` entry.
///
/// Constructed transiently per archive during a repository scan; not
/// persisted beyond the resolution pass that created it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name, unqualified (no author prefix).
    pub name: String,
    /// Version string for this release (e.g. `"1.0.2"`).
    pub version_number: String,
    /// Short human-readable summary of the package.
    #[serde(default)]
    pub description: String,
    /// URL of the project's homepage.
    #[serde(default)]
    pub website_url: String,
    /// Fully qualified dependency ids this version requires.
    #[serde(default)]
    pub dependencies: Vec<DependencyId>,
}

impl Manifest {
    /// Parse a manifest from raw bytes (e.g. streamed out of an archive).
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if the bytes are not a valid JSON
    /// manifest.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parse a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if the content is invalid or does not
    /// match the expected schema.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }
}

impl std::str::FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_MANIFEST: &str = r#"{
        "name": "SuperMod",
        "version_number": "1.0.2",
        "website_url": "https://example.com/supermod",
        "description": "Adds things",
        "dependencies": ["bbepis-BepInExPack-5.4.9"]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(EXAMPLE_MANIFEST).unwrap();

        assert_eq!(manifest.name, "SuperMod");
        assert_eq!(manifest.version_number, "1.0.2");
        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(
            manifest.dependencies[0],
            DependencyId::new("bbepis-BepInExPack-5.4.9")
        );
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = Manifest::parse(r#"{"name": "foo", "version_number": "0.1.0"}"#).unwrap();

        assert_eq!(manifest.name, "foo");
        assert!(manifest.description.is_empty());
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let manifest = Manifest::parse(
            r#"{"name": "foo", "version_number": "0.1.0", "install_mode": "managed"}"#,
        )
        .unwrap();
        assert_eq!(manifest.name, "foo");
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = Manifest::parse("this is not json {{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_required_fields() {
        // No version_number
        let result = Manifest::parse(r#"{"name": "foo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_str_trait() {
        use std::str::FromStr;
        let manifest = Manifest::from_str(EXAMPLE_MANIFEST);
        assert!(manifest.is_ok());
    }

    #[test]
    fn test_from_slice() {
        let manifest = Manifest::from_slice(EXAMPLE_MANIFEST.as_bytes()).unwrap();
        assert_eq!(manifest.name, "SuperMod");
    }
}
