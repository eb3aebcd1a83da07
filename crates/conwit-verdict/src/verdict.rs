//! Trial aggregation: modes, tallies and the final verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::runner::RunOutcome;

/// When to stop running trials early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Stop at the first run that does not reach the error.
    Strict,
    /// Run the whole trial budget.
    #[default]
    Normal,
    /// Stop at the first run that reaches the error.
    Permissive,
}

impl Mode {
    pub fn should_stop(self, outcome: RunOutcome) -> bool {
        matches!(
            (self, outcome),
            (Mode::Strict, RunOutcome::NotReached) | (Mode::Permissive, RunOutcome::ErrorReached)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Normal => "normal",
            Mode::Permissive => "permissive",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Mode::Strict),
            "normal" => Ok(Mode::Normal),
            "permissive" => Ok(Mode::Permissive),
            other => Err(format!(
                "unknown mode '{other}' (expected strict, normal or permissive)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Every conclusive trial reached the error.
    Always,
    /// No conclusive trial reached the error.
    Never,
    Sometimes,
    /// No trial was conclusive.
    Timeout,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Always => "ALWAYS",
            Verdict::Never => "NEVER",
            Verdict::Sometimes => "SOMETIMES",
            Verdict::Timeout => "TIMEOUT",
        })
    }
}

/// Outcome counts over a batch of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub reached: u32,
    pub not_reached: u32,
    pub timed_out: u32,
}

impl Tally {
    pub fn record(&mut self, outcome: RunOutcome) {
        match outcome {
            RunOutcome::ErrorReached => self.reached += 1,
            RunOutcome::NotReached => self.not_reached += 1,
            RunOutcome::TimedOut => self.timed_out += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.reached + self.not_reached + self.timed_out
    }

    /// Timed-out trials count toward neither side.
    pub fn verdict(&self) -> Verdict {
        match (self.reached > 0, self.not_reached > 0) {
            (true, true) => Verdict::Sometimes,
            (true, false) => Verdict::Always,
            (false, true) => Verdict::Never,
            (false, false) => Verdict::Timeout,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trials: {} (error reached: {}, not reached: {}, timed out: {})",
            self.total(),
            self.reached,
            self.not_reached,
            self.timed_out
        )
    }
}
