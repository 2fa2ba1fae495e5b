//! Subprocess spawning with captured output and a wall-clock limit.
//!
//! Every call spawns exactly one child and reaps it on every exit path.
//! On timeout the child is killed and waited for before returning.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Bytes beyond the limit are drained and discarded so the child never
/// blocks on a full pipe.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Standard error, decoded lossily as UTF-8.
    pub stderr: String,
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to exit.
    pub duration: Duration,
}

impl ProcessOutput {
    /// Returns true if the process exited with code 0.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Ways a process run can fail before producing a [`ProcessOutput`].
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program does not exist.
    #[error("executable not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The process outlived its time budget and was killed.
    #[error("process timed out after {0:?}")]
    Timeout(Duration),

    /// Any other spawn or wait failure.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Runs `program` with `args`, capturing both streams and enforcing `timeout`.
///
/// Stdin is closed; the working directory is inherited.
pub async fn run(
    program: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<ProcessOutput, ProcessError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ProcessError::NotFound(program.to_path_buf()),
        _ => ProcessError::Io(e),
    })?;

    debug!(program = %program.display(), pid = ?child.id(), "spawned process");

    // Read the pipes concurrently with `wait` so a chatty child cannot
    // deadlock on a full pipe buffer.
    let mut stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let mut stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    // The limit covers draining the pipes too: a background process that
    // inherited them keeps them open after the direct child exits.
    let collected = tokio::time::timeout(timeout, async {
        let status = child.wait().await?;
        let stdout = join_stream(&mut stdout_task).await?;
        let stderr = join_stream(&mut stderr_task).await?;
        Ok::<_, io::Error>((status, stdout, stderr))
    })
    .await;

    match collected {
        Ok(Ok((status, stdout_bytes, stderr_bytes))) => Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            exit_code: status.code(),
            duration: start.elapsed(),
        }),
        Ok(Err(e)) => {
            reap(&mut child).await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ProcessError::Io(e))
        }
        Err(_elapsed) => {
            warn!(
                program = %program.display(),
                timeout_ms = timeout.as_millis() as u64,
                "process timed out, killing"
            );
            reap(&mut child).await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ProcessError::Timeout(timeout))
        }
    }
}

/// Kills the child and waits for it so no zombie is left behind.
async fn reap(child: &mut tokio::process::Child) {
    if let Err(e) = child.kill().await {
        // Already exited; only its pipes were still held open.
        debug!("kill failed: {e}");
        let _ = child.try_wait();
    }
}

/// Reads an entire stream, keeping at most [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await?;
        tokio::io::copy(&mut h, &mut tokio::io::sink()).await?;
    }
    Ok(buf)
}

/// Waits for a reader task, treating a failed join as an I/O error.
async fn join_stream(task: &mut JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    match task.await {
        Ok(bytes) => bytes,
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}
