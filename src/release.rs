//! Local OS release detection.
//!
//! Reads the Ubuntu release codename (`jammy`, `noble`, ...) from
//! `/etc/os-release`. The codename selects which `dists/<codename>` tree of a
//! PPA is queried for its origin label.

use crate::error::{PkgCustomError, Result};
use std::fs;
use std::path::PathBuf;

/// Default location of the os-release file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

const CODENAME_KEY: &str = "UBUNTU_CODENAME";

/// Reads the release codename from an os-release file.
#[derive(Debug, Clone)]
pub struct ReleaseIdentifier {
    path: PathBuf,
}

impl ReleaseIdentifier {
    /// Create an identifier reading from a specific os-release file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the trimmed `UBUNTU_CODENAME` value.
    ///
    /// Fails with `Configuration` if the file cannot be read or the key is
    /// absent or empty.
    pub fn current_release_codename(&self) -> Result<String> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PkgCustomError::configuration(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        parse_release_codename(&content).ok_or_else(|| {
            PkgCustomError::configuration(format!(
                "Could not determine release codename: no {} in {}",
                CODENAME_KEY,
                self.path.display()
            ))
        })
    }
}

impl Default for ReleaseIdentifier {
    fn default() -> Self {
        Self::new(OS_RELEASE_PATH)
    }
}

/// Scan os-release content for a non-empty `UBUNTU_CODENAME` entry.
pub fn parse_release_codename(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != CODENAME_KEY {
            return None;
        }
        let value = value.trim().trim_matches('"').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
