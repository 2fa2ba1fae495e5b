//! Executable discovery.
//!
//! Probes candidate paths once at startup with `--version`. The result is
//! treated as read-only configuration for the lifetime of the kernel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::process::{self, ProcessOutput};
use crate::config::{ExecutableConfig, DEFAULT_COMMAND};

/// Flag passed to each candidate during discovery.
pub const PROBE_FLAG: &str = "--version";

/// Returns the first candidate that answers a `--version` probe.
///
/// A candidate is accepted if it exits 0 or mentions `marker`
/// (case-insensitive) on either stream. Bare command names are looked up
/// on `PATH` first and the resolved path is returned.
pub async fn resolve(
    candidates: &[PathBuf],
    probe_timeout: Duration,
    marker: &str,
) -> Option<PathBuf> {
    for candidate in candidates {
        let Some(program) = search_path(candidate) else {
            debug!(candidate = %candidate.display(), "not on PATH");
            continue;
        };

        match process::run(&program, &[PROBE_FLAG], probe_timeout).await {
            Ok(output) if accepts(&output, marker) => {
                info!(executable = %program.display(), "found query executable");
                return Some(program);
            }
            Ok(output) => {
                debug!(
                    candidate = %program.display(),
                    exit_code = ?output.exit_code,
                    "probe rejected"
                );
            }
            Err(e) => {
                debug!(candidate = %program.display(), "probe failed: {e}");
            }
        }
    }
    None
}

/// Picks the executable to use for this session.
///
/// An explicit `path` wins without probing. Otherwise candidates are probed,
/// falling back to the bare command name so that later queries report an
/// actionable "not found" error instead of failing at startup.
pub async fn locate(config: &ExecutableConfig) -> PathBuf {
    if let Some(path) = &config.path {
        info!(executable = %path.display(), "using configured executable");
        return path.clone();
    }

    match resolve(
        &config.candidate_paths(),
        config.probe_timeout(),
        &config.marker,
    )
    .await
    {
        Some(path) => path,
        None => {
            warn!("no working {DEFAULT_COMMAND} found, falling back to bare command name");
            PathBuf::from(DEFAULT_COMMAND)
        }
    }
}

/// Resolves bare names via `PATH`; paths with a separator are used as-is.
fn search_path(candidate: &Path) -> Option<PathBuf> {
    if candidate.components().count() == 1 && !candidate.is_absolute() {
        which::which(candidate).ok()
    } else {
        Some(candidate.to_path_buf())
    }
}

fn accepts(output: &ProcessOutput, marker: &str) -> bool {
    if output.succeeded() {
        return true;
    }
    let marker = marker.to_lowercase();
    output.stdout.to_lowercase().contains(&marker)
        || output.stderr.to_lowercase().contains(&marker)
}
