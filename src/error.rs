//! Error handling module for pkgcustom
//!
//! Provides the single error type used by every reconciliation component.
//! The engine never wraps or swallows these: whatever a collaborator returns
//! is what the host runtime sees.

use thiserror::Error;

/// Main error type for pkgcustom
#[derive(Error, Debug)]
pub enum PkgCustomError {
    /// Missing or malformed local system data (os-release, state file, config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Repository identifier is not of the form `tag:owner/name`
    #[error("Malformed repository identifier '{identifier}': {reason}")]
    MalformedIdentifier { identifier: String, reason: String },

    /// Repository metadata fetch failed (transport or non-success status)
    #[error("Network error: {0}")]
    Network(String),

    /// Repository metadata is missing an expected field
    #[error("Metadata parse error: {0}")]
    MetadataParse(String),

    /// Package manager or repository registration subprocess failed
    #[error("Command `{command}` failed (exit code {exit}): {stderr}", exit = exit_label(.code))]
    ExternalCommand {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// IO errors (preference files, state file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Result type alias for pkgcustom operations
pub type Result<T> = std::result::Result<T, PkgCustomError>;

// Convenient error constructors
impl PkgCustomError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a malformed identifier error
    pub fn malformed_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a metadata parse error
    pub fn metadata_parse(msg: impl Into<String>) -> Self {
        Self::MetadataParse(msg.into())
    }

    /// Create an external command error
    pub fn external_command(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExternalCommand {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }
}
