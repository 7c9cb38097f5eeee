//! Pin Manager
//!
//! Writes and removes apt preference records that pin every package from a
//! repository origin to priority 1001. A priority above 1000 makes apt prefer
//! that origin even when it means downgrading a locally installed version.
//!
//! One file per origin label, named after the label, inside a single
//! preferences directory (`/etc/apt/preferences.d` by default).

use crate::error::{PkgCustomError, Result};
use crate::locator::is_valid_origin_label;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

/// Default apt preferences directory.
pub const PREFERENCES_DIR: &str = "/etc/apt/preferences.d";

/// Priority that outranks the default archive and installed versions.
pub const PIN_PRIORITY: u16 = 1001;

/// Render the preference record for an origin label.
pub fn render_preference(origin_label: &str) -> String {
    format!(
        "Package: *\nPin: release o={}\nPin-Priority: {}\n",
        origin_label, PIN_PRIORITY
    )
}

/// Manages per-origin preference files in one directory.
#[derive(Debug, Clone)]
pub struct PinManager {
    dir: PathBuf,
    dry_run: bool,
}

impl PinManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            dry_run: false,
        }
    }

    /// Log file changes instead of performing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Path of the preference file for a label.
    ///
    /// Labels that apt would skip, or that could escape the directory, are
    /// rejected.
    pub fn preference_path(&self, origin_label: &str) -> Result<PathBuf> {
        if !is_valid_origin_label(origin_label) {
            return Err(PkgCustomError::configuration(format!(
                "Invalid origin label for preference file: '{}'",
                origin_label
            )));
        }
        Ok(self.dir.join(origin_label))
    }

    /// Write (or overwrite) the priority record for `origin_label`.
    pub fn set_priority(&self, origin_label: &str) -> Result<()> {
        let path = self.preference_path(origin_label)?;

        if self.dry_run {
            info!("[DRY RUN] Would write pin preference {}", path.display());
            return Ok(());
        }

        fs::write(&path, render_preference(origin_label))?;
        info!(
            "Pinned origin {} to priority {} ({})",
            origin_label,
            PIN_PRIORITY,
            path.display()
        );
        Ok(())
    }

    /// Remove the priority record for `origin_label`. Absent is not an error.
    pub fn clear_priority(&self, origin_label: &str) -> Result<()> {
        let path = self.preference_path(origin_label)?;

        if self.dry_run {
            info!("[DRY RUN] Would remove pin preference {}", path.display());
            return Ok(());
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed pin preference {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No pin preference at {}, nothing to remove", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a record currently exists for `origin_label`.
    pub fn has_priority(&self, origin_label: &str) -> bool {
        self.preference_path(origin_label)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }
}

impl Default for PinManager {
    fn default() -> Self {
        Self::new(PREFERENCES_DIR)
    }
}
