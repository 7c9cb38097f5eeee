//! Lifecycle management for apt/dpkg child processes
//!
//! Every external command is spawned in its own process group and tracked in
//! a global registry. When pkgcustom receives SIGINT, SIGTERM or SIGHUP it
//! records the signal, forwards SIGTERM to each tracked group, waits for them
//! to finish, and only then escalates to SIGKILL.
//!
//! The signal thread never exits the process. The interrupted command fails
//! in the main thread, the pass unwinds through the normal error path (which
//! saves state), and `main` exits with `128 + signal` afterwards.
//!
//! dpkg interrupted mid-unpack leaves the package database needing
//! `dpkg --configure -a`, so children get `SHUTDOWN_GRACE` before SIGKILL.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Grace period given to children after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

static CHILD_REGISTRY: OnceLock<Arc<Mutex<ChildRegistry>>> = OnceLock::new();

/// First shutdown signal received, 0 if none.
static SHUTDOWN_SIGNAL: AtomicI32 = AtomicI32::new(0);

/// The shutdown signal received so far, if any.
pub fn shutdown_signal() -> Option<i32> {
    match SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        0 => None,
        sig => Some(sig),
    }
}

/// PIDs (== process group IDs) of running children.
#[derive(Debug, Default)]
pub struct ChildRegistry {
    pids: HashSet<u32>,
    shutting_down: bool,
}

impl ChildRegistry {
    /// The process-wide registry used by the command runner.
    pub fn global() -> Arc<Mutex<ChildRegistry>> {
        CHILD_REGISTRY
            .get_or_init(|| Arc::new(Mutex::new(ChildRegistry::default())))
            .clone()
    }

    /// Track a child. Returns `false` once shutdown has begun, in which case
    /// the caller owns stopping it.
    pub fn register(&mut self, pid: u32) -> bool {
        if self.shutting_down {
            return false;
        }
        self.pids.insert(pid);
        debug!("Tracking child process group {}", pid);
        true
    }

    pub fn unregister(&mut self, pid: u32) {
        if self.pids.remove(&pid) {
            debug!("Child process group {} finished", pid);
        }
    }

    /// Refuse further registrations and hand back the groups still running.
    ///
    /// Only the first call returns anything.
    pub fn begin_shutdown(&mut self) -> Vec<u32> {
        if self.shutting_down {
            return Vec::new();
        }
        self.shutting_down = true;
        self.pids.drain().collect()
    }
}

/// SIGTERM every group, wait up to `grace`, SIGKILL the rest.
///
/// Must be called without the registry lock held: the threads waiting on
/// these children need it to unregister them.
pub fn stop_process_groups(pids: Vec<u32>, grace: Duration) {
    if pids.is_empty() {
        return;
    }

    info!("Stopping {} child process group(s)", pids.len());
    for &pid in &pids {
        signal_group(pid, Signal::SIGTERM);
    }

    let deadline = Instant::now() + grace;
    let mut remaining = pids;
    while Instant::now() < deadline {
        remaining.retain(|&pid| is_process_alive(pid));
        if remaining.is_empty() {
            info!("All child processes exited");
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }

    for &pid in remaining.iter().filter(|&&pid| is_process_alive(pid)) {
        warn!("Child process group {} ignored SIGTERM, sending SIGKILL", pid);
        signal_group(pid, Signal::SIGKILL);
    }
}

/// Signal a whole process group, falling back to the leader alone.
fn signal_group(pgid: u32, sig: Signal) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    if signal::kill(Pid::from_raw(-raw), sig).is_err() {
        if let Err(e) = signal::kill(Pid::from_raw(raw), sig) {
            debug!("Could not deliver {} to {}: {}", sig, pgid, e);
        }
    }
}

/// Whether a PID exists and is not a zombie.
fn is_process_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if signal::kill(Pid::from_raw(raw), None).is_err() {
        return false;
    }

    // Third field of /proc/<pid>/stat is the state letter
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => !matches!(stat.split_whitespace().nth(2), Some("Z" | "X")),
        Err(_) => true,
    }
}

/// Install handlers for SIGINT, SIGTERM and SIGHUP.
///
/// The first signal is recorded (see `shutdown_signal`) and tracked children
/// are stopped; later signals are only logged. Call once at startup.
pub fn init_signal_handlers() -> std::io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;

    thread::spawn(move || {
        for sig in signals.forever() {
            if SHUTDOWN_SIGNAL
                .compare_exchange(0, sig, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                warn!("Received signal {} while already shutting down", sig);
                continue;
            }

            info!("Received signal {}, stopping child processes", sig);
            let pids = match ChildRegistry::global().lock() {
                Ok(mut registry) => registry.begin_shutdown(),
                Err(poisoned) => poisoned.into_inner().begin_shutdown(),
            };
            stop_process_groups(pids, SHUTDOWN_GRACE);
        }
    });

    Ok(())
}

/// Extension trait for `std::process::Command` to isolate the child in a
/// new process group.
///
/// Keeps a terminal Ctrl+C from reaching dpkg directly; the signal handler
/// decides when children are stopped.
pub trait CommandProcessGroup {
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;
        self.process_group(0)
    }
}
