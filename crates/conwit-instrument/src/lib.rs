//! AST instrumentation for conwit.
//!
//! Rewrites a parsed program so that running it replays a violation
//! witness: thread switches become `yield`/`release` barrier pairs and
//! witnessed nondeterministic values become constants.
//!
//! # Modules
//!
//! - [`engine`] -- Barrier insertion and value pinning per transition
//! - [`locate`] -- Statement lookup by source line
//! - [`assumption`] -- `v == c` constraint parsing
//! - [`nondet`] -- The `__VERIFIER_nondet_*` type table
//! - [`prepare`] -- `reach_error` relinking, inline linkage, marker prototypes
//! - [`error`] -- Instrumentation failures

pub mod assumption;
pub mod engine;
pub mod error;
pub mod locate;
pub mod nondet;
pub mod prepare;

pub use assumption::{parse_assumption, Constraint};
pub use engine::{instrument, Barrier, InstrumentReport, Instrumenter, PinnedValue};
pub use error::InstrumentError;
pub use prepare::{prepare_for_linking, LinkReport};
