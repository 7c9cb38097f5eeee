//! Type-safe arguments for `add-apt-repository`.

use crate::command_traits::CommandArgs;

/// `add-apt-repository [--remove] --yes <identifier>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddAptRepositoryArgs {
    /// Repository identifier, e.g. `ppa:owner/name`.
    pub identifier: String,
    /// Remove the source instead of adding it.
    pub remove: bool,
}

impl AddAptRepositoryArgs {
    pub fn add(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            remove: false,
        }
    }

    pub fn remove(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            remove: true,
        }
    }
}

impl CommandArgs for AddAptRepositoryArgs {
    fn program(&self) -> &'static str {
        "add-apt-repository"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if self.remove {
            args.push("--remove".to_string());
        }
        args.push("--yes".to_string());
        args.push(self.identifier.clone());
        args
    }
}
