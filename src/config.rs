//! Desired configuration.
//!
//! The host runtime supplies three named values:
//!
//! | Key             | Type    | Default | Meaning |
//! |-----------------|---------|---------|---------|
//! | `packages`      | string  | `""`    | comma-separated package names |
//! | `hold-packages` | boolean | `false` | hold the packages at their installed version |
//! | `ppa`           | string  | `""`    | `tag:owner/name`, empty for none |
//!
//! `RawConfig` is that surface as it arrives (JSON file or CLI flags);
//! `DesiredConfiguration` is the parsed, normalized form the engine consumes.

use crate::error::{PkgCustomError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The three configuration values exactly as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub packages: String,
    #[serde(rename = "hold-packages")]
    pub hold_packages: bool,
    pub ppa: String,
}

impl RawConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PkgCustomError::configuration(format!(
                "Failed to read configuration from {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Replace values that were given explicitly (e.g. as CLI flags).
    pub fn with_overrides(
        mut self,
        packages: Option<String>,
        hold_packages: Option<bool>,
        ppa: Option<String>,
    ) -> Self {
        if let Some(packages) = packages {
            self.packages = packages;
        }
        if let Some(hold) = hold_packages {
            self.hold_packages = hold;
        }
        if let Some(ppa) = ppa {
            self.ppa = ppa;
        }
        self
    }
}

/// Parsed desired state for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredConfiguration {
    /// Repository to register, `None` when no repository is wanted.
    pub repository_id: Option<String>,
    /// Deduplicated, sorted package names.
    pub packages: BTreeSet<String>,
    /// Hold every package in `packages`.
    pub hold_requested: bool,
}

impl DesiredConfiguration {
    pub fn new(packages: &str, hold_requested: bool, ppa: &str) -> Self {
        let ppa = ppa.trim();
        Self {
            repository_id: (!ppa.is_empty()).then(|| ppa.to_string()),
            packages: parse_package_list(packages),
            hold_requested,
        }
    }
}

impl From<&RawConfig> for DesiredConfiguration {
    fn from(raw: &RawConfig) -> Self {
        Self::new(&raw.packages, raw.hold_packages, &raw.ppa)
    }
}

/// Parse a comma-separated package declaration.
///
/// Entries are trimmed, empty entries dropped, duplicates collapsed.
pub fn parse_package_list(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
