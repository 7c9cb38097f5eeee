//! Persisted reconciliation state.
//!
//! `PersistedState` records what the previous passes actually applied. It is
//! the "previous" side of every diff the engine computes, so it must only
//! ever describe applied state, never desired-but-unapplied state.
//!
//! `StateStore` keeps it as a JSON file. A missing file means first run and
//! yields the defaults; a corrupt file is an error rather than a silent reset,
//! since resetting would forget which repository and holds need undoing.

use crate::error::{PkgCustomError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the state file.
pub const STATE_FILE: &str = "/var/lib/pkgcustom/state.json";

/// State carried across invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Force a full package pass; set whenever the repository identity changes.
    pub needs_reinstall: bool,
    /// Currently registered repository identifier.
    pub repository_id: Option<String>,
    /// Origin label pinned for `repository_id`. Only present with it.
    pub repository_origin_label: Option<String>,
    /// Whether the applied packages are held.
    pub hold_enabled: bool,
    /// Packages applied by the last successful package pass, sorted.
    pub applied_packages: BTreeSet<String>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            needs_reinstall: true,
            repository_id: None,
            repository_origin_label: None,
            hold_enabled: false,
            applied_packages: BTreeSet::new(),
        }
    }
}

impl PersistedState {
    /// Check the cross-field invariant.
    pub fn validate(&self) -> Result<()> {
        if self.repository_origin_label.is_some() && self.repository_id.is_none() {
            return Err(PkgCustomError::configuration(
                "State records an origin label without a repository",
            ));
        }
        Ok(())
    }
}

/// JSON file holding `PersistedState`.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, or the defaults if no state file exists yet.
    pub fn load(&self) -> Result<PersistedState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state at {}, starting from defaults", self.path.display());
                return Ok(PersistedState::default());
            }
            Err(e) => {
                return Err(PkgCustomError::configuration(format!(
                    "Failed to read state from {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let state: PersistedState = serde_json::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    /// Write the state atomically (temp file + rename).
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(STATE_FILE)
    }
}
