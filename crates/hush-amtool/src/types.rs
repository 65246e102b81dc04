//! Shared data types for hush-amtool.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ConnectionMode
// ---------------------------------------------------------------------------

/// How `kubectl` reaches the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// In-cluster service-account credentials.
    #[default]
    In,
    /// The local kubeconfig (`KUBECONFIG` or `~/.kube/config`).
    Out,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::In => write!(f, "in"),
            ConnectionMode::Out => write!(f, "out"),
        }
    }
}

impl FromStr for ConnectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in" => Ok(ConnectionMode::In),
            "out" => Ok(ConnectionMode::Out),
            other => Err(format!("Kubernetes connection unknown: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecOptions / ExecResult
// ---------------------------------------------------------------------------

/// Default time budget for one remote command.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Kill the child after this many seconds.
    pub timeout_secs: u64,
    /// Cap on stdout/stderr characters quoted in error messages.
    pub max_output_chars: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_output_chars: crate::truncate::DEFAULT_MAX_CHARS,
        }
    }
}

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Process exit code. `-1` when killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
