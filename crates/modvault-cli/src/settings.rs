//! Settings file and directory layout.
//!
//! ```text
//! ~/.modvault/
//! ├── config.toml   # repository_path, install_dir
//! └── packages/     # default install destination
//! ```

use anyhow::{Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the primary configuration directory, or None if the user's home
/// cannot be resolved.
pub fn try_modvault_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("MODVAULT_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".modvault"))
}

/// Returns the canonical modvault home directory (`~/.modvault`).
///
/// # Panics
///
/// Panics if neither `MODVAULT_HOME` is set nor the user's home directory
/// can be resolved.
pub fn modvault_home() -> PathBuf {
    try_modvault_home().expect("Could not determine home directory. Set MODVAULT_HOME to override.")
}

/// Settings file path: ~/.modvault/config.toml
pub fn config_path() -> PathBuf {
    modvault_home().join("config.toml")
}

/// Default install destination: ~/.modvault/packages
pub fn default_install_dir() -> PathBuf {
    modvault_home().join("packages")
}

/// Persisted user settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Directory scanned for package archives.
    #[serde(default)]
    pub repository_path: Option<PathBuf>,
    /// Directory packages are installed under.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the config file, defaulting everything when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// The effective repository path: a CLI override wins over the settings
    /// file; `None` means no repository is configured.
    pub fn repository_path(&self, cli_override: Option<&Path>) -> Option<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.repository_path.clone())
    }

    /// The effective install directory.
    pub fn install_dir(&self) -> PathBuf {
        self.install_dir.clone().unwrap_or_else(default_install_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(settings.repository_path.is_none());
        assert!(settings.install_dir.is_none());
    }

    #[test]
    fn config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "repository_path = \"/srv/mods\"\ninstall_dir = \"/srv/installed\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.repository_path.as_deref(), Some(Path::new("/srv/mods")));
        assert_eq!(settings.install_dir(), PathBuf::from("/srv/installed"));
    }

    #[test]
    fn cli_override_wins() {
        let settings = Settings {
            repository_path: Some(PathBuf::from("/from/config")),
            install_dir: None,
        };
        let effective = settings.repository_path(Some(Path::new("/from/cli")));
        assert_eq!(effective.as_deref(), Some(Path::new("/from/cli")));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "repository_path = [not toml").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
