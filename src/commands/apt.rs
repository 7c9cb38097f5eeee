//! Type-safe arguments for `apt-get` and `apt-mark`.
//!
//! - `AptGetUpdateArgs` for `apt-get update`
//! - `AptGetInstallArgs` for `apt-get install`
//! - `AptMarkArgs` for `apt-mark hold|unhold`

use crate::command_traits::CommandArgs;
use strum::{Display, EnumString};

fn noninteractive_env() -> Vec<(String, String)> {
    vec![("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())]
}

// ============================================================================
// apt-get update
// ============================================================================

/// Refresh the package cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AptGetUpdateArgs;

impl CommandArgs for AptGetUpdateArgs {
    fn program(&self) -> &'static str {
        "apt-get"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["update".to_string()]
    }

    fn get_env_vars(&self) -> Vec<(String, String)> {
        noninteractive_env()
    }
}

// ============================================================================
// apt-get install
// ============================================================================

/// Install (or keep installed) a batch of packages.
///
/// Existing configuration files are kept (`--force-confold`) so a reinstall
/// never prompts or clobbers local edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptGetInstallArgs {
    pub packages: Vec<String>,
}

impl CommandArgs for AptGetInstallArgs {
    fn program(&self) -> &'static str {
        "apt-get"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "--yes".to_string(),
            "--option=Dpkg::Options::=--force-confold".to_string(),
            "install".to_string(),
        ];
        args.extend(self.packages.iter().cloned());
        args
    }

    fn get_env_vars(&self) -> Vec<(String, String)> {
        noninteractive_env()
    }
}

// ============================================================================
// apt-mark
// ============================================================================

/// Hold state change applied by `apt-mark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MarkAction {
    Hold,
    Unhold,
}

/// `apt-mark hold|unhold <packages..>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptMarkArgs {
    pub action: MarkAction,
    pub packages: Vec<String>,
}

impl CommandArgs for AptMarkArgs {
    fn program(&self) -> &'static str {
        "apt-mark"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![self.action.to_string()];
        args.extend(self.packages.iter().cloned());
        args
    }
}
