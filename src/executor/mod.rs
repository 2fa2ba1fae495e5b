//! Query execution against the external ExpoCLI tool.
//!
//! This module isolates the subprocess call and its mapping to an
//! [`ExecutionResult`] from the notebook protocol layer.

pub mod locate;
mod mock;
pub mod process;

pub use locate::{locate, resolve};
pub use mock::MockQueryRunner;
pub use process::{ProcessError, ProcessOutput};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

/// Installation hint appended to "not found" errors.
pub const INSTALL_HINT: &str = "Please install ExpoCLI first:\n  \
     git clone https://github.com/PierreBx/ExpoCLI\n  \
     cd ExpoCLI\n  \
     ./install.sh";

/// Outcome of running one query. Built fresh per call, never persisted.
///
/// On failure `output` may still carry partial stdout; both fields are kept
/// and the caller decides what to show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Whether the process exited with code 0.
    pub success: bool,
    /// Captured stdout.
    pub output: String,
    /// Stderr, or a synthesized message.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Successful run with the given stdout.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// Failed run with no output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Failed run that still produced some stdout.
    pub fn partial(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }

    /// Maps a completed process to a result.
    pub fn from_output(out: ProcessOutput) -> Self {
        match out.exit_code {
            Some(0) => Self::success(out.stdout),
            code => {
                let error = if out.stderr.is_empty() {
                    match code {
                        Some(code) => format!("ExpoCLI exited with code {code}"),
                        None => "ExpoCLI was terminated by a signal".to_string(),
                    }
                } else {
                    out.stderr
                };
                Self::partial(out.stdout, error)
            }
        }
    }
}

/// Message reported when a query outlives its time budget.
pub fn timeout_message(limit: Duration) -> String {
    format!("Query execution timed out ({} limit)", format_limit(limit))
}

/// Message reported when the executable cannot be found.
pub fn not_found_message(path: &Path) -> String {
    format!(
        "ExpoCLI executable not found at: {}\n\n{INSTALL_HINT}",
        path.display()
    )
}

fn format_limit(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

/// Anything that can turn query text into an [`ExecutionResult`].
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Runs one query. Never fails: errors are folded into the result.
    async fn run(&self, query: &str) -> ExecutionResult;
}

/// Runs queries by spawning the ExpoCLI executable.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    executable: Arc<PathBuf>,
    timeout: Duration,
}

impl QueryExecutor {
    /// Creates an executor for an already located executable.
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: Arc::new(executable.into()),
            timeout,
        }
    }

    /// Path the executor invokes.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Wall-clock limit per query.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `query` as the single argument of the executable.
    ///
    /// Blank input returns an empty success without spawning anything.
    pub async fn execute(&self, query: &str) -> ExecutionResult {
        let query = query.trim();
        if query.is_empty() {
            return ExecutionResult::success("");
        }

        debug!(query, "executing query");

        match process::run(&self.executable, &[query], self.timeout).await {
            Ok(out) => {
                info!(
                    exit_code = ?out.exit_code,
                    duration_ms = out.duration.as_millis() as u64,
                    "query finished"
                );
                ExecutionResult::from_output(out)
            }
            Err(ProcessError::Timeout(limit)) => ExecutionResult::failure(timeout_message(limit)),
            Err(ProcessError::NotFound(path)) => {
                ExecutionResult::failure(not_found_message(&path))
            }
            Err(ProcessError::Io(e)) => ExecutionResult::failure(format!("Unexpected error: {e}")),
        }
    }
}

#[async_trait]
impl QueryRunner for QueryExecutor {
    async fn run(&self, query: &str) -> ExecutionResult {
        self.execute(query).await
    }
}
