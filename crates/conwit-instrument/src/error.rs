//! Instrumentation errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    /// A thread switch points past the last statement of the program.
    #[error("no statement at or after line {line} to place a schedule barrier")]
    NoTargetStatement { line: usize },
}

impl InstrumentError {
    /// Short reason reported as `Verdict: <reason>`.
    pub fn verdict_reason(&self) -> &'static str {
        match self {
            InstrumentError::NoTargetStatement { .. } => "Incompatible witness",
        }
    }
}
