//! pkgcustom library
//!
//! Reconciles a machine's apt configuration (one PPA with pinning, a package
//! set and its hold state) against a declared desired configuration, applying
//! only what changed since the previous pass.

pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod locator;
pub mod package_manager;
pub mod pin;
pub mod process_guard;
pub mod release;
pub mod repository;
pub mod sanity;
pub mod state;
pub mod status;

// Re-export main types for convenience
pub use command_runner::CommandRunner;
pub use command_traits::CommandArgs;
pub use config::{DesiredConfiguration, RawConfig, parse_package_list};
pub use engine::{
    Collaborators, PackageOp, ReconcilePhase, RepositoryOp, apply_and_persist, reconcile,
};
pub use error::{PkgCustomError, Result};
pub use locator::{
    HttpMetadataFetcher, MetadataFetcher, OriginResolver, PpaCoordinates, RepositoryLocator,
    build_url,
};
pub use package_manager::{AptPackageManager, PackageManager};
pub use pin::{PIN_PRIORITY, PinManager};
pub use process_guard::{ChildRegistry, CommandProcessGroup};
pub use release::ReleaseIdentifier;
pub use repository::{AptRepositoryRegistry, RepositoryRegistry};
pub use state::{PersistedState, StateStore};
pub use status::{ConsoleReporter, StatusReporter, StatusSummary};
