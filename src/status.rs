//! Status reporting back to the host runtime.

use crate::state::PersistedState;
use std::fmt;
use tracing::info;

/// Summary of the applied configuration after a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub hold_enabled: bool,
    /// Applied packages in persisted (sorted) order.
    pub packages: Vec<String>,
}

impl StatusSummary {
    pub fn from_state(state: &PersistedState) -> Self {
        Self {
            hold_enabled: state.hold_enabled,
            packages: state.applied_packages.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hold = if self.hold_enabled { "True" } else { "False" };
        write!(f, "Hold: {}; Packages: {}", hold, self.packages.join(","))
    }
}

/// Receives status transitions during a pass.
pub trait StatusReporter {
    /// Work in progress (e.g. "Configuring").
    fn maintenance(&mut self, message: &str);

    /// Pass completed; the system matches `summary`.
    fn active(&mut self, summary: &StatusSummary);
}

/// Logs maintenance messages and prints the final status to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl StatusReporter for ConsoleReporter {
    fn maintenance(&mut self, message: &str) {
        info!("Status: maintenance ({})", message);
    }

    fn active(&mut self, summary: &StatusSummary) {
        info!("Status: active ({})", summary);
        println!("{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_held() {
        let summary = StatusSummary {
            hold_enabled: true,
            packages: vec!["curl".to_string(), "vim".to_string()],
        };
        assert_eq!(summary.to_string(), "Hold: True; Packages: curl,vim");
    }

    #[test]
    fn test_display_empty() {
        let summary = StatusSummary::from_state(&PersistedState::default());
        assert_eq!(summary.to_string(), "Hold: False; Packages: ");
    }

    #[test]
    fn test_from_state_uses_sorted_order() {
        let mut state = PersistedState::default();
        state.applied_packages.insert("zsh".to_string());
        state.applied_packages.insert("curl".to_string());

        let summary = StatusSummary::from_state(&state);
        assert_eq!(summary.packages, vec!["curl", "zsh"]);
    }
}
