//! Pre-flight checks for the host environment
//!
//! Verified before a real (non dry-run) pass touches anything:
//! - Running with root privileges (EUID 0)
//! - The apt tooling pkgcustom drives is on `PATH`

use crate::error::{PkgCustomError, Result};
use crate::process_guard::CommandProcessGroup;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Binaries every reconciliation pass may invoke.
const REQUIRED_BINARIES: &[&str] = &["add-apt-repository", "apt-get", "apt-mark"];

/// Result of environment verification
#[derive(Debug)]
pub struct PreflightReport {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl PreflightReport {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }

    /// One line per failed check.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.is_root {
            problems.push("root privileges required (run with sudo)".to_string());
        }
        for binary in &self.missing_binaries {
            problems.push(format!(
                "{} not found (install: apt-get install {})",
                binary,
                package_for_binary(binary)
            ));
        }
        problems
    }
}

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .in_new_process_group()
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Map binary names to the Ubuntu package that ships them
fn package_for_binary(binary: &str) -> &'static str {
    match binary {
        "add-apt-repository" => "software-properties-common",
        "apt-get" | "apt-mark" => "apt",
        _ => "unknown",
    }
}

/// Run all checks and return the report
pub fn verify_environment() -> PreflightReport {
    let missing_binaries = REQUIRED_BINARIES
        .iter()
        .filter(|binary| !binary_exists(binary))
        .map(|binary| (*binary).to_string())
        .collect();

    PreflightReport {
        missing_binaries,
        is_root: nix::unistd::geteuid().is_root(),
    }
}

/// Verify the environment, failing with every problem found.
pub fn run_preflight_checks() -> Result<()> {
    debug!("Running pre-flight checks...");

    let report = verify_environment();
    if !report.is_ok() {
        return Err(PkgCustomError::configuration(format!(
            "Pre-flight checks failed: {}",
            report.problems().join("; ")
        )));
    }

    info!("Pre-flight checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_exists_sh() {
        assert!(binary_exists("sh"), "sh should be available");
    }

    #[test]
    fn test_binary_exists_nonexistent() {
        assert!(!binary_exists("this_binary_definitely_does_not_exist_12345"));
    }

    #[test]
    fn test_package_mapping() {
        assert_eq!(package_for_binary("add-apt-repository"), "software-properties-common");
        assert_eq!(package_for_binary("apt-mark"), "apt");
    }

    #[test]
    fn test_report_problems() {
        let ok = PreflightReport {
            missing_binaries: vec![],
            is_root: true,
        };
        assert!(ok.is_ok());
        assert!(ok.problems().is_empty());

        let bad = PreflightReport {
            missing_binaries: vec!["add-apt-repository".to_string()],
            is_root: false,
        };
        assert!(!bad.is_ok());
        let problems = bad.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems[1].contains("software-properties-common"));
    }
}
