//! Type-safe external command contracts.
//!
//! Every program pkgcustom runs (`apt-get`, `apt-mark`, `add-apt-repository`)
//! is described by a struct implementing `CommandArgs`. The struct is the
//! contract: flag spelling lives in exactly one place and the runner never
//! sees raw string vectors assembled ad hoc.

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name, resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `get_env_vars()`: extra environment for the child (defaults to none).
pub trait CommandArgs {
    /// Executable name (e.g. `apt-mark`).
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    ///
    /// Example: `["hold", "curl", "vim"]`
    fn to_cli_args(&self) -> Vec<String>;

    /// Environment variables the command requires.
    ///
    /// Example: `[("DEBIAN_FRONTEND", "noninteractive")]`
    fn get_env_vars(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Full command line for logs and error messages.
    fn command_line(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}
