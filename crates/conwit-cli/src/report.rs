//! The stdout progress protocol.

use conwit_verdict::{CompilerOutput, RunOutcome, TrialObserver, TrialRecord};

/// Prints compiler and program output between `... started` and
/// `... ended (...)` lines.
pub struct StdoutReporter;

fn print_nonempty(text: &str) {
    if !text.is_empty() {
        println!("{}", text.trim_end_matches('\n'));
    }
}

fn exit_code_text(exit_code: Option<i32>) -> String {
    exit_code.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

impl TrialObserver for StdoutReporter {
    fn compilation_started(&mut self) {
        println!("Compilation started");
    }

    fn compilation_finished(&mut self, output: &CompilerOutput) {
        print_nonempty(&output.stdout);
        print_nonempty(&output.stderr);
        println!("Compilation ended (exit code {})", exit_code_text(output.exit_code));
    }

    fn trial_started(&mut self, _index: u32) {
        println!("Execution started");
    }

    fn trial_finished(&mut self, _index: u32, record: &TrialRecord) {
        print_nonempty(&record.stdout);
        print_nonempty(&record.stderr);
        match record.outcome {
            RunOutcome::TimedOut => println!("Execution ended (timeout)"),
            _ => println!("Execution ended (exit code {})", exit_code_text(record.exit_code)),
        }
    }
}
