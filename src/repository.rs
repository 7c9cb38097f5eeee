//! Repository registration collaborator
//!
//! `RepositoryRegistry` adds and removes an apt source by identifier.
//! `AptRepositoryRegistry` shells out to `add-apt-repository`, which also
//! imports the signing key and refreshes the cache for the new source.

use crate::command_runner::CommandRunner;
use crate::commands::repository::AddAptRepositoryArgs;
use crate::error::Result;
use tracing::info;

/// Register / unregister a third-party package source.
pub trait RepositoryRegistry {
    fn register(&mut self, identifier: &str) -> Result<()>;
    fn unregister(&mut self, identifier: &str) -> Result<()>;
}

/// `RepositoryRegistry` backed by `add-apt-repository`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AptRepositoryRegistry {
    runner: CommandRunner,
}

impl AptRepositoryRegistry {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl RepositoryRegistry for AptRepositoryRegistry {
    fn register(&mut self, identifier: &str) -> Result<()> {
        self.runner.run(&AddAptRepositoryArgs::add(identifier))?;
        info!("Registered repository {}", identifier);
        Ok(())
    }

    fn unregister(&mut self, identifier: &str) -> Result<()> {
        self.runner.run(&AddAptRepositoryArgs::remove(identifier))?;
        info!("Unregistered repository {}", identifier);
        Ok(())
    }
}
