use crate::pin::PREFERENCES_DIR;
use crate::release::OS_RELEASE_PATH;
use crate::state::STATE_FILE;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// pkgcustom - reconcile apt packages, holds and PPA pinning
#[derive(Parser, Debug)]
#[command(name = "pkgcustom")]
#[command(about = "Reconciles installed packages, package holds and PPA pinning against a declared configuration")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: log what would change without changing it.
    ///
    /// apt commands, preference file writes and the state file save are
    /// skipped. The os-release read and the PPA metadata fetch still run so
    /// the preview shows the real origin label.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Where reconciliation state persists between runs
    #[arg(long, global = true, default_value = STATE_FILE)]
    pub state_file: PathBuf,

    /// apt preferences directory for pin records
    #[arg(long, global = true, default_value = PREFERENCES_DIR)]
    pub preferences_dir: PathBuf,

    /// os-release file providing UBUNTU_CODENAME
    #[arg(long, global = true, default_value = OS_RELEASE_PATH)]
    pub os_release: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconciliation pass and print the resulting status
    Apply {
        /// JSON file with `packages`, `hold-packages` and `ppa` keys
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Comma-separated package names (overrides the file)
        #[arg(short, long)]
        packages: Option<String>,

        /// Hold the packages at their installed version (overrides the file)
        #[arg(long, num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
        hold_packages: Option<bool>,

        /// Repository identifier, `ppa:owner/name`; empty for none (overrides the file)
        #[arg(long)]
        ppa: Option<String>,

        /// Skip the root and required-binary checks
        #[arg(long)]
        skip_preflight: bool,
    },
    /// Print the status recorded by the last pass
    Status,
    /// Run the pre-flight checks only
    Check,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
