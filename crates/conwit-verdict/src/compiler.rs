//! C compiler invocation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::VerdictError;

/// Which compiler to run and with which flags. Sources and `-o <binary>` are
/// appended per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub cc: String,
    pub flags: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            cc: "gcc".to_string(),
            flags: vec!["-w".to_string(), "-pthread".to_string()],
        }
    }
}

/// Captured compiler output, surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CompilerOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Compiles `sources` into `binary`. A failing compiler is not an error
/// here; callers inspect [`CompilerOutput::success`].
pub async fn compile(
    config: &CompilerConfig,
    sources: &[&Path],
    binary: &Path,
) -> Result<CompilerOutput, VerdictError> {
    let mut command = Command::new(&config.cc);
    command.args(&config.flags).args(sources).arg("-o").arg(binary);
    debug!(cc = %config.cc, binary = %binary.display(), "compiling");

    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| VerdictError::CompilerSpawn {
            cc: config.cc.clone(),
            source,
        })?;
    Ok(CompilerOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}
