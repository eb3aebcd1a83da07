//! Single trial execution with a wall-clock timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::VerdictError;
use crate::runtime::{ERROR_EXIT_CODE, REACHED_ERROR_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    ErrorReached,
    NotReached,
    /// Killed at the timeout; inconclusive.
    TimedOut,
}

/// What one run of the program did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub outcome: RunOutcome,
    /// `None` when killed by a signal or timed out.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Exit status 74 or the marker line on stdout means the error was reached.
pub fn classify(exit_code: Option<i32>, stdout: &str) -> RunOutcome {
    if exit_code == Some(ERROR_EXIT_CODE) || stdout.contains(REACHED_ERROR_MARKER) {
        RunOutcome::ErrorReached
    } else {
        RunOutcome::NotReached
    }
}

/// Runs `binary` once. The child is killed if it outlives `timeout`.
pub async fn run_trial(binary: &Path, timeout: Duration) -> Result<TrialRecord, VerdictError> {
    let child = Command::new(binary)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| VerdictError::Spawn {
            path: binary.to_path_buf(),
            source,
        })?;

    // Dropping the timed-out future drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let exit_code = output.status.code();
            let outcome = classify(exit_code, &stdout);
            debug!(?exit_code, ?outcome, "trial finished");
            Ok(TrialRecord {
                outcome,
                exit_code,
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "trial timed out");
            Ok(TrialRecord {
                outcome: RunOutcome::TimedOut,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_or_marker_reaches_error() {
        assert_eq!(classify(Some(74), ""), RunOutcome::ErrorReached);
        assert_eq!(classify(Some(0), "x\nReached error!\n"), RunOutcome::ErrorReached);
        assert_eq!(classify(Some(0), "done\n"), RunOutcome::NotReached);
        assert_eq!(classify(None, ""), RunOutcome::NotReached);
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = run_trial(Path::new("/nonexistent/conwit-bin"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, VerdictError::Spawn { .. }));
    }

    #[test]
    fn outcomes_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RunOutcome::ErrorReached).unwrap(),
            "\"error-reached\""
        );
    }
}
