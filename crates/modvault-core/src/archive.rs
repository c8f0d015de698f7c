//! Package archive reading.
//!
//! Wraps a zip archive on disk with the three operations a package source
//! needs: enumerate entries in the archive's native physical order, stream
//! out a single named entry (to read metadata without a full extraction),
//! and unpack everything into a destination directory with overwrite
//! semantics.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

/// Errors that can occur while opening or reading a package archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive file does not exist or could not be opened.
    #[error("failed to open archive {}: {source}", path.display())]
    Open {
        /// Path of the archive that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The file exists but is not a recognized zip archive.
    #[error("not a recognized package archive {}: {source}", path.display())]
    Format {
        /// Path of the unrecognized file.
        path: PathBuf,
        /// Underlying zip parsing failure.
        source: ZipError,
    },

    /// An entry could not be located or decompressed.
    #[error("archive entry error: {0}")]
    Entry(#[from] ZipError),

    /// An I/O error occurred while reading or writing entry contents.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An entry's path would escape the extraction root (zip slip).
    #[error("entry path escapes extraction root: {0}")]
    UnsafeEntryPath(String),
}

/// Metadata for one stored entry, in the archive's native order.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Path of the entry within the archive.
    pub key: String,
    /// Whether the entry is a directory marker.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
}

/// An opened package archive.
///
/// Handles are scoped resources: a repository scan opens archives one at a
/// time and drops each handle before opening the next, keeping open-file
/// usage bounded across large directories.
#[derive(Debug)]
pub struct PackageArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl PackageArchive {
    /// Open an archive file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the path cannot be opened and
    /// [`ArchiveError::Format`] if it is not a valid zip archive.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(file).map_err(|source| ArchiveError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Path this archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive contains no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// List entry metadata in the archive's native physical order.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Entry`] if an entry header cannot be read.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>, ArchiveError> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            entries.push(EntryInfo {
                key: entry.name().to_string(),
                is_dir: entry.is_dir(),
                size: entry.size(),
            });
        }
        Ok(entries)
    }

    /// Read the first entry whose file-name component equals `file_name`,
    /// at any depth. Returns `None` if no entry matches.
    ///
    /// Entries are considered in native order, so for archives with several
    /// same-named files the physically first one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if a matching entry cannot be decompressed.
    pub fn read_entry_named(&mut self, file_name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut matched = None;
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name_matches = Path::new(entry.name())
                .file_name()
                .is_some_and(|name| name == file_name);
            if name_matches {
                matched = Some(index);
                break;
            }
        }
        let Some(index) = matched else {
            return Ok(None);
        };

        let mut entry = self.archive.by_index(index)?;
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// Extract the full archive into `dest`.
    ///
    /// Creates `dest` if absent, recreates intra-archive directories first,
    /// then writes all non-directory entries, overwriting any pre-existing
    /// file at the same relative path. Repeated unpacks of the same archive
    /// are therefore idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsafeEntryPath`] for entries whose names
    /// would escape `dest`, or an I/O error if writing fails. Files already
    /// written before a failure are left in place.
    pub fn unpack(&mut self, dest: &Path) -> Result<(), ArchiveError> {
        fs::create_dir_all(dest)?;

        // Directories first so empty ones survive even with no file entries.
        for index in 0..self.archive.len() {
            let entry = self.archive.by_index(index)?;
            if !entry.is_dir() {
                continue;
            }
            let relative = safe_entry_path(entry.name(), entry.enclosed_name())?;
            fs::create_dir_all(dest.join(relative))?;
        }

        for index in 0..self.archive.len() {
            let mut entry = self.archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let relative = safe_entry_path(entry.name(), entry.enclosed_name())?;
            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
            }
        }

        Ok(())
    }
}

fn safe_entry_path(name: &str, enclosed: Option<PathBuf>) -> Result<PathBuf, ArchiveError> {
    enclosed.ok_or_else(|| ArchiveError::UnsafeEntryPath(name.to_string()))
}
