//! Core logic for modvault: archive reading and package sources.
//!
//! A [`source::PackageSource`] discovers package manifests from some backing
//! repository, registers them into its [`source::Catalog`] keyed by
//! author+name, and extracts one resolved version's contents on demand.
//! [`source::LocalPackageSource`] is the flat-directory implementation;
//! remote, paginated sources plug in behind the same trait.

pub mod archive;
pub mod source;

pub use archive::{ArchiveError, EntryInfo, PackageArchive};
pub use source::{Catalog, InstallError, LocalPackageSource, PackageSource, SourceError};
