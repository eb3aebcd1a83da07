//! Compile once, run many: the validation driver.
//!
//! The instrumented source and the runtime are written to a scratch
//! directory, compiled, and the binary is run trial by trial on a
//! current-thread tokio runtime. Progress is reported through a
//! [`TrialObserver`] so the caller owns all printing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compiler::{compile, CompilerOutput};
use crate::config::ValidationConfig;
use crate::error::VerdictError;
use crate::runner::{run_trial, TrialRecord};
use crate::runtime::{RUNTIME_FILE_NAME, RUNTIME_SOURCE};
use crate::verdict::{Tally, Verdict};

const PROGRAM_FILE_NAME: &str = "program.c";
const BINARY_FILE_NAME: &str = "program";

/// Hooks for progress reporting. All methods default to no-ops.
pub trait TrialObserver {
    fn compilation_started(&mut self) {}
    fn compilation_finished(&mut self, _output: &CompilerOutput) {}
    fn trial_started(&mut self, _index: u32) {}
    fn trial_finished(&mut self, _index: u32, _record: &TrialRecord) {}
}

impl TrialObserver for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub verdict: Verdict,
    pub tally: Tally,
}

/// Runs `binary` up to `config.max_trials` times, stopping early as the
/// mode dictates.
pub async fn run_trials(
    binary: &Path,
    config: &ValidationConfig,
    observer: &mut dyn TrialObserver,
) -> Result<Tally, VerdictError> {
    let mut tally = Tally::default();
    for index in 0..config.max_trials {
        observer.trial_started(index);
        let record = run_trial(binary, config.timeout).await?;
        tally.record(record.outcome);
        observer.trial_finished(index, &record);
        if config.mode.should_stop(record.outcome) {
            debug!(index, mode = %config.mode, outcome = ?record.outcome, "stopping early");
            break;
        }
    }
    Ok(tally)
}

async fn compile_and_run(
    dir: &Path,
    source: &str,
    config: &ValidationConfig,
    observer: &mut dyn TrialObserver,
) -> Result<ValidationResult, VerdictError> {
    let program = dir.join(PROGRAM_FILE_NAME);
    let runtime = dir.join(RUNTIME_FILE_NAME);
    let binary = dir.join(BINARY_FILE_NAME);
    tokio::fs::write(&program, source).await?;
    tokio::fs::write(&runtime, RUNTIME_SOURCE).await?;

    observer.compilation_started();
    let output = compile(&config.compiler, &[program.as_path(), runtime.as_path()], &binary).await?;
    observer.compilation_finished(&output);
    if !output.success() {
        return Err(VerdictError::Compilation {
            exit_code: output.exit_code,
        });
    }

    let tally = run_trials(&binary, config, observer).await?;
    let verdict = tally.verdict();
    info!(%verdict, %tally, "validation finished");
    Ok(ValidationResult { verdict, tally })
}

/// Async form of [`validate`].
pub async fn validate_async(
    source: &str,
    config: &ValidationConfig,
    observer: &mut dyn TrialObserver,
) -> Result<ValidationResult, VerdictError> {
    let dir = tempfile::Builder::new().prefix("conwit-").tempdir()?;
    let result = compile_and_run(dir.path(), source, config, observer).await;
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        warn!(dir = %path.display(), error = %e, "failed to remove scratch directory");
    }
    result
}

/// Compiles `source` against the runtime and runs the trials.
pub fn validate(
    source: &str,
    config: &ValidationConfig,
    observer: &mut dyn TrialObserver,
) -> Result<ValidationResult, VerdictError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(validate_async(source, config, observer))
}
