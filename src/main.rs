//! pkgcustom - main entry point
//!
//! Invoked by the host runtime whenever the desired configuration changes.
//! Logs go to stderr; the status line is the only thing written to stdout.

use anyhow::{Context, Result};
use pkgcustom::cli::{Cli, Commands};
use pkgcustom::{
    AptPackageManager, AptRepositoryRegistry, Collaborators, CommandRunner, ConsoleReporter,
    DesiredConfiguration, HttpMetadataFetcher, PinManager, RawConfig, ReleaseIdentifier,
    RepositoryLocator, StateStore, StatusSummary, apply_and_persist, process_guard, sanity,
};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber (RUST_LOG overrides the default level)
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    debug!("CLI arguments parsed: {:?}", cli);

    // Children must be stopped cleanly if the host runtime kills us mid-pass
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let result = match &cli.command {
        Commands::Apply {
            config,
            packages,
            hold_packages,
            ppa,
            skip_preflight,
        } => {
            let raw = load_raw_config(config.as_deref())?.with_overrides(
                packages.clone(),
                *hold_packages,
                ppa.clone(),
            );
            run_apply(&cli, &raw, *skip_preflight)
        }
        Commands::Status => run_status(&cli),
        Commands::Check => sanity::run_preflight_checks()
            .map(|()| println!("Pre-flight checks passed"))
            .map_err(Into::into),
    };

    // State is already saved; report the interruption through the exit code
    if let Some(sig) = process_guard::shutdown_signal() {
        if let Err(e) = &result {
            error!("{:#}", e);
        }
        warn!("Exiting after signal {}", sig);
        std::process::exit(128 + sig);
    }

    result
}

fn load_raw_config(path: Option<&Path>) -> Result<RawConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            RawConfig::load_from_file(path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))
        }
        None => Ok(RawConfig::default()),
    }
}

/// Run one reconciliation pass against the live system.
fn run_apply(cli: &Cli, raw: &RawConfig, skip_preflight: bool) -> Result<()> {
    if cli.dry_run {
        info!("Dry-run mode: no changes will be made");
    } else if skip_preflight {
        warn!("Pre-flight checks skipped");
    } else {
        sanity::run_preflight_checks()?;
    }

    let desired = DesiredConfiguration::from(raw);
    debug!("Desired configuration: {:?}", desired);

    let store = StateStore::new(&cli.state_file);
    let runner = CommandRunner::new(cli.dry_run);
    let mut packages = AptPackageManager::new(runner);
    let mut repositories = AptRepositoryRegistry::new(runner);
    let locator = RepositoryLocator::new(
        HttpMetadataFetcher::new()?,
        ReleaseIdentifier::new(&cli.os_release),
    );
    let pins = PinManager::new(&cli.preferences_dir).with_dry_run(cli.dry_run);

    let mut host = Collaborators {
        packages: &mut packages,
        repositories: &mut repositories,
        origins: &locator,
        pins: &pins,
    };
    apply_and_persist(&desired, &store, &mut host, &mut ConsoleReporter, cli.dry_run)
        .with_context(|| {
            format!("Reconciliation pass failed (state file {})", store.path().display())
        })?;
    Ok(())
}

/// Print the status recorded by the last pass.
fn run_status(cli: &Cli) -> Result<()> {
    let state = StateStore::new(&cli.state_file).load().with_context(|| {
        format!("Failed to load reconciliation state from {}", cli.state_file.display())
    })?;

    match (&state.repository_id, &state.repository_origin_label) {
        (Some(id), Some(label)) => {
            info!("Repository: {} (pinned origin {})", id, label);
            if !PinManager::new(&cli.preferences_dir).has_priority(label) {
                warn!("Pin preference for origin {} is missing; next pass will not restore it", label);
            }
        }
        (Some(id), None) => warn!("Repository: {} (not pinned)", id),
        _ => info!("Repository: none"),
    }
    if state.needs_reinstall {
        info!("Next pass will reinstall packages");
    }

    println!("{}", StatusSummary::from_state(&state));
    Ok(())
}
