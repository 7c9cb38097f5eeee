//! Repository Reconciler
//!
//! Keeps the registered PPA and its pin record in step with the desired
//! repository identifier.
//!
//! # Transitions
//!
//! | previous | desired | label recorded | Plan |
//! |----------|---------|----------------|------|
//! | none     | none    | -              | (nothing) |
//! | A        | A       | yes            | (nothing) |
//! | A        | A       | no             | Repin(A) |
//! | A        | none    | any            | Unregister(A) |
//! | none     | B       | -              | Register(B) |
//! | A        | B       | any            | Unregister(A) → Register(B) |
//!
//! # Ordering
//!
//! Unregister (including pin cleanup) always completes before Register starts,
//! so two repositories' pin records are never active together and the new
//! repository's metadata is never resolved against a half-removed source.
//!
//! # Failure
//!
//! State is updated only after the step that justifies it succeeds:
//!
//! - unregister fails → previous repository and label stay recorded
//! - register fails → nothing recorded, next pass registers again
//! - origin resolution or pin write fails after register → repository
//!   recorded without a label, next pass re-pins it

use crate::engine::Collaborators;
use crate::error::Result;
use crate::locator::PpaCoordinates;
use crate::state::PersistedState;
use std::fmt;
use tracing::info;

/// A single repository step, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOp {
    /// Remove a registered repository and its pin record, if any.
    Unregister {
        repository_id: String,
        origin_label: Option<String>,
    },
    /// Register a repository, resolve its origin and pin it.
    Register { repository_id: String },
    /// Resolve and pin an already-registered repository that has no pin.
    Repin { repository_id: String },
}

impl fmt::Display for RepositoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregister {
                repository_id,
                origin_label: Some(label),
            } => write!(f, "Unregister({}, unpin {})", repository_id, label),
            Self::Unregister { repository_id, .. } => write!(f, "Unregister({})", repository_id),
            Self::Register { repository_id } => write!(f, "Register({})", repository_id),
            Self::Repin { repository_id } => write!(f, "Repin({})", repository_id),
        }
    }
}

/// Compute the repository steps for one pass.
pub fn plan_repository(
    previous_id: Option<&str>,
    previous_label: Option<&str>,
    desired_id: Option<&str>,
) -> Vec<RepositoryOp> {
    let mut ops = Vec::new();

    if let Some(previous) = previous_id {
        if desired_id != Some(previous) {
            ops.push(RepositoryOp::Unregister {
                repository_id: previous.to_string(),
                origin_label: previous_label.map(str::to_string),
            });
        }
    }

    match desired_id {
        Some(desired) if previous_id != Some(desired) => ops.push(RepositoryOp::Register {
            repository_id: desired.to_string(),
        }),
        Some(desired) if previous_label.is_none() => ops.push(RepositoryOp::Repin {
            repository_id: desired.to_string(),
        }),
        _ => {}
    }

    ops
}

/// Bring repository registration and pinning in line with `desired_id`.
///
/// Returns the steps that were executed.
pub fn reconcile_repository(
    desired_id: Option<&str>,
    state: &mut PersistedState,
    host: &mut Collaborators<'_>,
) -> Result<Vec<RepositoryOp>> {
    let ops = plan_repository(
        state.repository_id.as_deref(),
        state.repository_origin_label.as_deref(),
        desired_id,
    );

    // Reject a bad identifier before touching the previous repository.
    for op in &ops {
        if let RepositoryOp::Register { repository_id } | RepositoryOp::Repin { repository_id } = op
        {
            PpaCoordinates::parse(repository_id)?;
        }
    }

    for op in &ops {
        info!("Repository step: {}", op);
        match op {
            RepositoryOp::Unregister {
                repository_id,
                origin_label,
            } => {
                host.repositories.unregister(repository_id)?;
                if let Some(label) = origin_label {
                    host.pins.clear_priority(label)?;
                }
                state.repository_id = None;
                state.repository_origin_label = None;
                state.needs_reinstall = true;
            }
            RepositoryOp::Register { repository_id } => {
                host.repositories.register(repository_id)?;
                state.repository_id = Some(repository_id.clone());
                state.repository_origin_label = None;
                state.needs_reinstall = true;
                pin_repository(repository_id, state, host)?;
            }
            RepositoryOp::Repin { repository_id } => {
                pin_repository(repository_id, state, host)?;
            }
        }
    }

    Ok(ops)
}

fn pin_repository(
    repository_id: &str,
    state: &mut PersistedState,
    host: &mut Collaborators<'_>,
) -> Result<()> {
    let label = host.origins.resolve_origin_label(repository_id)?;
    host.pins.set_priority(&label)?;
    state.repository_origin_label = Some(label);
    Ok(())
}
