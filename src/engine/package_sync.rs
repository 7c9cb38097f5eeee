//! Package Set Reconciler
//!
//! Applies the desired package set and hold flag.
//!
//! # Plan
//!
//! 1. If the set changed, or a reinstall is forced: unhold the *previously*
//!    applied set (including packages being dropped, so no hold is left
//!    behind), then install the whole desired set as one batch.
//! 2. Hold the desired set if holding is requested, otherwise unhold it.
//!    Step 2 always runs so a change to the hold flag alone takes effect.
//!
//! Empty sets produce no step. Installing an installed package is a no-op
//! for apt, so no install-only subset is computed.

use crate::config::DesiredConfiguration;
use crate::error::Result;
use crate::package_manager::PackageManager;
use crate::state::PersistedState;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

/// A single package step, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOp {
    Unhold(Vec<String>),
    Install(Vec<String>),
    Hold(Vec<String>),
}

impl fmt::Display for PackageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, packages) = match self {
            Self::Unhold(p) => ("Unhold", p),
            Self::Install(p) => ("Install", p),
            Self::Hold(p) => ("Hold", p),
        };
        write!(f, "{}({})", name, packages.join(","))
    }
}

fn to_list(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// Compute the package steps for one pass.
pub fn plan_packages(
    applied: &BTreeSet<String>,
    desired: &BTreeSet<String>,
    hold_requested: bool,
    force: bool,
) -> Vec<PackageOp> {
    let mut ops = Vec::new();

    if desired != applied || force {
        if !applied.is_empty() {
            ops.push(PackageOp::Unhold(to_list(applied)));
        }
        if !desired.is_empty() {
            ops.push(PackageOp::Install(to_list(desired)));
        }
    }

    if !desired.is_empty() {
        if hold_requested {
            ops.push(PackageOp::Hold(to_list(desired)));
        } else {
            ops.push(PackageOp::Unhold(to_list(desired)));
        }
    }

    ops
}

/// Apply the desired packages and hold flag, then record them as applied.
///
/// `force` re-runs the install step even when the set is unchanged
/// (used after the repository changed).
pub fn reconcile_packages(
    desired: &DesiredConfiguration,
    force: bool,
    state: &mut PersistedState,
    packages: &mut dyn PackageManager,
) -> Result<Vec<PackageOp>> {
    let ops = plan_packages(
        &state.applied_packages,
        &desired.packages,
        desired.hold_requested,
        force,
    );

    if force {
        debug!("Package reinstall forced");
    }

    for op in &ops {
        info!("Package step: {}", op);
        match op {
            PackageOp::Unhold(list) => packages.unhold(list)?,
            PackageOp::Install(list) => packages.install(list)?,
            PackageOp::Hold(list) => packages.hold(list)?,
        }
    }

    state.hold_enabled = desired.hold_requested;
    state.applied_packages = desired.packages.clone();
    Ok(ops)
}
