//! Jupyter kernelspec generation.
//!
//! Writes `<dir>/expocli/kernel.json` so notebook front-ends can launch this
//! binary in `--serve` mode.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{KernelError, Result};
use crate::kernel::info::LANGUAGE;

/// Directory name of the kernelspec under the install root.
pub const KERNEL_NAME: &str = "expocli";

/// Contents of `kernel.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelSpec {
    pub argv: Vec<String>,
    pub display_name: String,
    pub language: String,
}

impl KernelSpec {
    /// Builds a spec that launches `executable`.
    pub fn for_executable(executable: &Path) -> Self {
        Self {
            argv: vec![
                executable.display().to_string(),
                "--serve".to_string(),
                "--connection-file".to_string(),
                "{connection_file}".to_string(),
            ],
            display_name: "ExpoCLI".to_string(),
            language: LANGUAGE.to_string(),
        }
    }
}

/// Writes the kernelspec under `root`, returning the path of `kernel.json`.
pub fn install(root: &Path, spec: &KernelSpec) -> Result<PathBuf> {
    let dir = root.join(KERNEL_NAME);
    fs::create_dir_all(&dir)?;

    let path = dir.join("kernel.json");
    let json = serde_json::to_string_pretty(spec)
        .map_err(|e| KernelError::internal(format!("failed to serialize kernelspec: {e}")))?;
    fs::write(&path, json)?;

    info!(path = %path.display(), "installed kernelspec");
    Ok(path)
}
