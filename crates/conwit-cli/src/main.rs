//! conwit command-line validator.
//!
//! Provides the `conwit` binary: given a C program and a GraphML violation
//! witness, it instruments the program to follow the witness, compiles and
//! runs it repeatedly, and prints `Verdict: <result>` on stdout.
//!
//! Every fatal path prints `Verdict: <reason>` and exits with `-1`.

mod pipeline;
mod report;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use conwit_verdict::config::DEFAULT_MAX_TRIALS;
use conwit_verdict::{CompilerConfig, Mode, ValidationConfig};

use crate::pipeline::{PipelineOptions, UNKNOWN_ERROR};

/// Validate concurrent violation witnesses by execution.
#[derive(Parser)]
#[command(name = "conwit", version, about = "Validate concurrent violation witnesses by execution")]
struct Cli {
    /// Program under validation.
    #[arg(value_name = "INPUT.c")]
    input: PathBuf,

    /// Violation witness in GraphML.
    #[arg(long, visible_alias = "graphml-witness", value_name = "WITNESS.graphml")]
    witness: PathBuf,

    /// Trial mode: strict, normal or permissive.
    #[arg(long, default_value = "normal")]
    mode: String,

    /// Maximum number of trials.
    #[arg(long, default_value_t = DEFAULT_MAX_TRIALS)]
    trials: u32,

    /// Per-trial timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// C compiler to invoke.
    #[arg(long, default_value = "gcc")]
    cc: String,

    /// Also write the instrumented program to this path.
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,

    /// Print the resolved witness transitions as JSON before compiling.
    #[arg(long)]
    dump_transitions: bool,

    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    process::exit(run(cli));
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the validator. Returns the process exit code.
fn run(cli: Cli) -> i32 {
    let mode: Mode = match cli.mode.parse() {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("Error: {msg}");
            println!("Verdict: {UNKNOWN_ERROR}");
            return -1;
        }
    };

    let options = PipelineOptions {
        input: cli.input,
        witness: cli.witness,
        emit: cli.emit,
        dump_transitions: cli.dump_transitions,
        validation: ValidationConfig {
            mode,
            max_trials: cli.trials,
            timeout: Duration::from_secs(cli.timeout_secs),
            compiler: CompilerConfig {
                cc: cli.cc,
                ..CompilerConfig::default()
            },
        },
    };

    match pipeline::run(&options) {
        Ok(result) => {
            println!("{}", result.tally);
            println!("Verdict: {}", result.verdict);
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            println!("Verdict: {}", e.verdict_reason());
            -1
        }
    }
}
