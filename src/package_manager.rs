//! Package manager collaborator
//!
//! The reconciliation engine talks to apt only through the `PackageManager`
//! trait. `AptPackageManager` implements it with `apt-get` and `apt-mark`
//! subprocesses via the command runner; tests substitute a recording fake.
//!
//! Every operation takes an ordered slice of package names. An empty slice
//! is a no-op and never reaches a subprocess.

use crate::command_runner::CommandRunner;
use crate::commands::apt::{AptGetInstallArgs, AptGetUpdateArgs, AptMarkArgs, MarkAction};
use crate::error::Result;
use tracing::{debug, info};

/// Install and hold/unhold operations on system packages.
pub trait PackageManager {
    /// Refresh the package cache, then install `packages` as one batch.
    fn install(&mut self, packages: &[String]) -> Result<()>;

    /// Prevent `packages` from being upgraded or removed.
    fn hold(&mut self, packages: &[String]) -> Result<()>;

    /// Release holds on `packages`.
    fn unhold(&mut self, packages: &[String]) -> Result<()>;
}

/// `PackageManager` backed by `apt-get` / `apt-mark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptPackageManager {
    runner: CommandRunner,
}

impl AptPackageManager {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn mark(&self, action: MarkAction, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            debug!("apt-mark {} called with no packages, skipping", action);
            return Ok(());
        }

        self.runner.run(&AptMarkArgs {
            action,
            packages: packages.to_vec(),
        })?;
        info!("apt-mark {}: {}", action, packages.join(","));
        Ok(())
    }
}

impl PackageManager for AptPackageManager {
    fn install(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            debug!("install called with no packages, skipping");
            return Ok(());
        }

        self.runner.run(&AptGetUpdateArgs)?;
        self.runner.run(&AptGetInstallArgs {
            packages: packages.to_vec(),
        })?;
        info!("Installed packages: {}", packages.join(","));
        Ok(())
    }

    fn hold(&mut self, packages: &[String]) -> Result<()> {
        self.mark(MarkAction::Hold, packages)
    }

    fn unhold(&mut self, packages: &[String]) -> Result<()> {
        self.mark(MarkAction::Unhold, packages)
    }
}
