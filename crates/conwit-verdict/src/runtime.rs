//! The C runtime linked into every instrumented program.
//!
//! It defines `reach_error`, the `yield`/`release` schedule barriers and
//! zero-returning `__VERIFIER_nondet_*` functions.

/// Source of the runtime, written next to the program before compiling.
pub const RUNTIME_SOURCE: &str = include_str!("../runtime/svcomp.c");

pub const RUNTIME_FILE_NAME: &str = "svcomp.c";

/// Printed by `reach_error` before exiting.
pub const REACHED_ERROR_MARKER: &str = "Reached error!";

/// Exit status of `reach_error`.
pub const ERROR_EXIT_CODE: i32 = 74;
