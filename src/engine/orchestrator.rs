//! Orchestrator: one full reconciliation pass.
//!
//! ```text
//! Idle
//!   ↓ maintenance("Configuring")
//! Repository   (repo_sync)
//!   ↓ force = needs_reinstall
//! Packages     (package_sync)
//!   ↓ needs_reinstall = false, active(summary)
//! Idle
//! ```
//!
//! Any error aborts the pass and is returned unchanged. Whatever state was
//! updated before the failure stays updated; every step is safe to repeat,
//! so the next pass resumes from there. `apply_and_persist` wraps a pass
//! with the state file: it saves after failed passes too, and never in
//! dry-run.

use crate::config::DesiredConfiguration;
use crate::engine::package_sync::reconcile_packages;
use crate::engine::repo_sync::reconcile_repository;
use crate::engine::Collaborators;
use crate::error::Result;
use crate::state::{PersistedState, StateStore};
use crate::status::{StatusReporter, StatusSummary};
use strum::Display;
use tracing::{debug, error, info};

/// Phase of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReconcilePhase {
    #[strum(serialize = "idle")]
    Idle,
    #[strum(serialize = "configuring repository")]
    Repository,
    #[strum(serialize = "configuring packages")]
    Packages,
}

fn enter(phase: ReconcilePhase) {
    debug!("Reconcile phase: {}", phase);
}

/// Run one pass: repository phase, package phase, then status.
pub fn reconcile(
    desired: &DesiredConfiguration,
    state: &mut PersistedState,
    host: &mut Collaborators<'_>,
    reporter: &mut dyn StatusReporter,
) -> Result<StatusSummary> {
    info!("Beginning reconciliation pass");
    reporter.maintenance("Configuring");

    enter(ReconcilePhase::Repository);
    let repository_ops = reconcile_repository(desired.repository_id.as_deref(), state, host)?;

    enter(ReconcilePhase::Packages);
    let force = state.needs_reinstall;
    let package_ops = reconcile_packages(desired, force, state, &mut *host.packages)?;
    state.needs_reinstall = false;

    enter(ReconcilePhase::Idle);
    let summary = StatusSummary::from_state(state);
    reporter.active(&summary);

    info!(
        "Finished reconciliation pass ({} repository step(s), {} package step(s))",
        repository_ops.len(),
        package_ops.len()
    );
    Ok(summary)
}

/// Load state from `store`, run one pass, and save the result.
///
/// The pass error, if any, wins over a save error; the save error is then
/// only logged. In dry-run the file is left untouched.
pub fn apply_and_persist(
    desired: &DesiredConfiguration,
    store: &StateStore,
    host: &mut Collaborators<'_>,
    reporter: &mut dyn StatusReporter,
    dry_run: bool,
) -> Result<StatusSummary> {
    let mut state = store.load()?;
    let outcome = reconcile(desired, &mut state, host, reporter);

    if dry_run {
        info!("[DRY RUN] State not saved to {}", store.path().display());
        return outcome;
    }

    let saved = store.save(&state);
    match outcome {
        Ok(summary) => saved.map(|()| summary),
        Err(e) => {
            error!("Reconciliation pass failed: {}", e);
            match saved {
                Ok(()) => info!("Partial progress saved to {}", store.path().display()),
                Err(save_err) => error!(
                    "Failed to save state to {} after failed pass: {}",
                    store.path().display(),
                    save_err
                ),
            }
            Err(e)
        }
    }
}
