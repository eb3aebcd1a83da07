//! The end-to-end validation pipeline: read, sanitize, parse, load the
//! witness, instrument, render, compile and run.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use conwit_cfront::ParseError;
use conwit_instrument::InstrumentError;
use conwit_verdict::{ValidationConfig, ValidationResult, VerdictError};
use conwit_witness::WitnessError;

use crate::report::StdoutReporter;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Everything one validation run needs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub witness: PathBuf,
    pub emit: Option<PathBuf>,
    pub dump_transitions: bool,
    pub validation: ValidationConfig,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The program file could not be read, or `--emit` could not be written.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Witness(#[from] WitnessError),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Verdict(#[from] VerdictError),

    #[error("failed to serialize transitions: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Short reason reported as `Verdict: <reason>`.
    pub fn verdict_reason(&self) -> &'static str {
        match self {
            PipelineError::Parse(e) => e.verdict_reason(),
            PipelineError::Witness(e) => e.verdict_reason(),
            PipelineError::Instrument(e) => e.verdict_reason(),
            PipelineError::Verdict(e) => e.verdict_reason(),
            PipelineError::File { .. } | PipelineError::Json(_) => UNKNOWN_ERROR,
        }
    }
}

fn read_program(path: &Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Instruments the program at `options.input` with the witness and returns
/// the C text to compile.
pub fn instrumented_source(options: &PipelineOptions) -> Result<String, PipelineError> {
    let original = read_program(&options.input)?;
    let (sanitized, mut tu) = conwit_cfront::parse_sanitized(&original)?;

    // Coordinates are resolved against the sanitized text, which keeps every
    // line and offset of the original.
    let transitions = conwit_witness::load_transitions(&options.witness, sanitized.as_bytes())?;
    info!(transitions = transitions.len(), "witness loaded");
    if options.dump_transitions {
        println!("{}", serde_json::to_string_pretty(&transitions)?);
    }

    let replayed = conwit_instrument::instrument(&mut tu, &transitions)?;
    debug!(
        barriers = replayed.barriers.len(),
        pinned = replayed.pinned.len(),
        "witness replayed"
    );
    let link = conwit_instrument::prepare_for_linking(&mut tu);
    debug!(
        error_function_relinked = link.error_function_relinked,
        extern_inline = ?link.extern_inline,
        "prepared for linking"
    );
    let source = conwit_cfront::render(&tu);

    if let Some(path) = &options.emit {
        std::fs::write(path, &source).map_err(|source| PipelineError::File {
            path: path.clone(),
            source,
        })?;
    }
    Ok(source)
}

/// Runs the whole pipeline, printing the progress protocol on stdout.
pub fn run(options: &PipelineOptions) -> Result<ValidationResult, PipelineError> {
    let source = instrumented_source(options)?;
    let mut reporter = StdoutReporter;
    Ok(conwit_verdict::validate(
        &source,
        &options.validation,
        &mut reporter,
    )?)
}
