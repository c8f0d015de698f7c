//! Shared data model for modvault.
//!
//! Identifier newtypes, the archive-embedded package manifest, and the
//! resolved version/group records that package sources register into their
//! catalogs. Kept free of any filesystem or archive logic so both sources
//! and front-ends can depend on it.

pub mod ident;
pub mod manifest;
pub mod package;

pub use ident::{DependencyId, GroupId};
pub use manifest::{Manifest, ManifestError};
pub use package::{PackageGroupInfo, PackageVersion, PackageVersionInfo};
