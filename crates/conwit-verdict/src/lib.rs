//! Compilation, trial execution and verdicts for conwit.
//!
//! # Modules
//!
//! - [`validate`] -- Scratch directory, compile, trial loop
//! - [`compiler`] -- Compiler configuration and invocation
//! - [`runner`] -- One trial with a timeout, outcome classification
//! - [`verdict`] -- Modes, tallies and verdicts
//! - [`config`] -- [`ValidationConfig`] and its defaults
//! - [`runtime`] -- The embedded C runtime and its exit contract
//! - [`error`] -- Verdict engine failures

pub mod compiler;
pub mod config;
pub mod error;
pub mod runner;
pub mod runtime;
pub mod validate;
pub mod verdict;

pub use compiler::{CompilerConfig, CompilerOutput};
pub use config::ValidationConfig;
pub use error::VerdictError;
pub use runner::{RunOutcome, TrialRecord};
pub use validate::{run_trials, validate, validate_async, TrialObserver, ValidationResult};
pub use verdict::{Mode, Tally, Verdict};
