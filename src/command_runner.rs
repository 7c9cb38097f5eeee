//! Type-Safe Command Execution
//!
//! `CommandRunner::run` is the only place pkgcustom spawns processes.
//! Going through it guarantees:
//!
//! - Process group isolation and PID registration (see `process_guard`)
//! - The exact argv and environment are logged before execution
//! - Non-zero exit becomes `PkgCustomError::ExternalCommand`
//! - `--dry-run` is honoured uniformly
//! - No new child starts once a shutdown signal has arrived

use crate::command_traits::CommandArgs;
use crate::error::{PkgCustomError, Result};
use crate::process_guard::{
    ChildRegistry, CommandProcessGroup, SHUTDOWN_GRACE, shutdown_signal, stop_process_groups,
};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Executes typed commands, or only logs them in dry-run mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    dry_run: bool,
}

impl CommandRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Run a command to completion.
    ///
    /// Captured stdout and stderr are logged at debug level.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - exit code 0 (or skipped in dry-run mode)
    /// - `Err(ExternalCommand)` - spawn failure, non-zero exit, killed by
    ///   signal, or refused because pkgcustom is shutting down
    pub fn run<T: CommandArgs>(&self, args: &T) -> Result<()> {
        let command_line = args.command_line();
        let env_vars = args.get_env_vars();

        if self.dry_run {
            info!("[DRY RUN] Skipped: {}", command_line);
            return Ok(());
        }

        if let Some(sig) = shutdown_signal() {
            return Err(PkgCustomError::external_command(
                command_line,
                None,
                format!("not started: shutting down on signal {}", sig),
            ));
        }

        info!("Running: {} env={:?}", command_line, env_vars);

        let mut cmd = Command::new(args.program());
        cmd.args(args.to_cli_args())
            .envs(env_vars)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .in_new_process_group();

        let child = cmd.spawn().map_err(|e| {
            PkgCustomError::external_command(&command_line, None, format!("failed to spawn: {}", e))
        })?;
        let pid = child.id();

        let tracked = match ChildRegistry::global().lock() {
            Ok(mut registry) => registry.register(pid),
            Err(_) => true,
        };
        if !tracked {
            // Shutdown began between the check above and the spawn
            stop_process_groups(vec![pid], SHUTDOWN_GRACE);
        }

        let waited = child.wait_with_output();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let output = waited.map_err(|e| {
            PkgCustomError::external_command(&command_line, None, format!("failed to wait: {}", e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            debug!("[{}] {}", args.program(), line);
        }
        for line in stderr.lines() {
            debug!("[{} stderr] {}", args.program(), line);
        }

        if !output.status.success() {
            return Err(PkgCustomError::external_command(
                command_line,
                output.status.code(),
                stderr.trim(),
            ));
        }

        debug!("{} finished", args.program());
        Ok(())
    }
}
