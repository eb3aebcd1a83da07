//! Verdict engine errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerdictError {
    /// Writing sources or creating the scratch directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The compiler could not be started.
    #[error("failed to run compiler '{cc}': {source}")]
    CompilerSpawn {
        cc: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited unsuccessfully.
    #[error("compilation failed (exit code {exit_code:?})")]
    Compilation { exit_code: Option<i32> },

    /// The compiled program could not be started.
    #[error("failed to run '{}': {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VerdictError {
    /// Short reason reported as `Verdict: <reason>`.
    pub fn verdict_reason(&self) -> &'static str {
        match self {
            VerdictError::Compilation { .. } => "Compilation error",
            VerdictError::Io(_) | VerdictError::CompilerSpawn { .. } | VerdictError::Spawn { .. } => {
                "Unknown error"
            }
        }
    }
}
