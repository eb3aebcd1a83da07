//! Validation settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compiler::CompilerConfig;
use crate::verdict::Mode;

pub const DEFAULT_MAX_TRIALS: u32 = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub mode: Mode,
    /// Upper bound on trials; `strict` and `permissive` may stop earlier.
    pub max_trials: u32,
    /// Wall-clock limit per trial.
    pub timeout: Duration,
    pub compiler: CompilerConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            mode: Mode::default(),
            max_trials: DEFAULT_MAX_TRIALS,
            timeout: DEFAULT_TIMEOUT,
            compiler: CompilerConfig::default(),
        }
    }
}
