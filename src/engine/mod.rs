//! Engine modules: the reconciliation logic.
//!
//! Each reconciler first computes an ordered plan from (previous, desired)
//! with no side effects, then executes it against the collaborators,
//! updating `PersistedState` as each step succeeds.
//!
//! - `repo_sync`: repository registration and pinning
//! - `package_sync`: package install and hold state
//! - `orchestrator`: one full pass (repository, then packages, then status),
//!   and the persisted variant that saves state after it

pub mod orchestrator;
pub mod package_sync;
pub mod repo_sync;

use crate::locator::OriginResolver;
use crate::package_manager::PackageManager;
use crate::pin::PinManager;
use crate::repository::RepositoryRegistry;

/// External systems a reconciliation pass acts on.
pub struct Collaborators<'a> {
    pub packages: &'a mut dyn PackageManager,
    pub repositories: &'a mut dyn RepositoryRegistry,
    pub origins: &'a dyn OriginResolver,
    pub pins: &'a PinManager,
}

pub use orchestrator::{apply_and_persist, reconcile, ReconcilePhase};
pub use package_sync::{plan_packages, reconcile_packages, PackageOp};
pub use repo_sync::{plan_repository, reconcile_repository, RepositoryOp};
