//! Query execution integration tests.
//!
//! Exercises the subprocess path end to end: argument passing, exit codes,
//! timeouts and process cleanup.

use std::path::Path;
use std::time::{Duration, Instant};

use expocli_kernel::executor::process::{self, MAX_OUTPUT_BYTES};
use expocli_kernel::executor::{ExecutionResult, QueryExecutor};

use super::fake_tool;

fn executor(path: &Path) -> QueryExecutor {
    QueryExecutor::new(path, Duration::from_secs(10))
}

#[tokio::test]
async fn test_execute_success_returns_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", r#"echo "Alice | 35""#);

    let result = executor(&tool)
        .execute("SELECT name FROM examples/books.xml WHERE price > 30")
        .await;

    assert_eq!(result, ExecutionResult::success("Alice | 35\n"));
}

#[tokio::test]
async fn test_query_is_passed_as_single_trimmed_argument() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", r#"printf '%s|%s' "$#" "$1""#);

    let result = executor(&tool)
        .execute("  SELECT * FROM a.xml WHERE name = 'x y'  \n")
        .await;

    assert!(result.success);
    assert_eq!(result.output, "1|SELECT * FROM a.xml WHERE name = 'x y'");
}

#[tokio::test]
async fn test_nonzero_exit_uses_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(
        dir.path(),
        "expocli",
        "echo 'partial'; echo 'Error: file not found' >&2; exit 1",
    );

    let result = executor(&tool).execute("SELECT * FROM missing.xml").await;

    assert_eq!(
        result,
        ExecutionResult::partial("partial\n", "Error: file not found\n")
    );
}

#[tokio::test]
async fn test_nonzero_exit_without_stderr_names_code() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "exit 7");

    let result = executor(&tool).execute("SELECT 1").await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("code 7"));
}

#[tokio::test]
async fn test_timeout_kills_process() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let tool = fake_tool(
        dir.path(),
        "expocli",
        &format!("echo $$ > {}\nexec sleep 30", pid_file.display()),
    );

    let start = Instant::now();
    let result = QueryExecutor::new(&tool, Duration::from_millis(300))
        .execute("SELECT * FROM huge.xml")
        .await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(
        result,
        ExecutionResult::failure("Query execution timed out (300ms limit)")
    );

    // The child was killed and reaped, so its /proc entry is gone.
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    if Path::new("/proc").exists() {
        assert!(!Path::new("/proc").join(pid.trim()).exists());
    }
}

#[tokio::test]
async fn test_background_pipe_holder_does_not_outlive_timeout() {
    let dir = tempfile::tempdir().unwrap();
    // The backgrounded sleep inherits stdout and keeps it open after the script exits.
    let tool = fake_tool(dir.path(), "expocli", "sleep 4 &\necho hi");

    let start = Instant::now();
    let result = QueryExecutor::new(&tool, Duration::from_millis(500))
        .execute("SELECT 1")
        .await;

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(
        result,
        ExecutionResult::failure("Query execution timed out (500ms limit)")
    );
}

#[tokio::test]
async fn test_output_beyond_cap_is_truncated_and_drained() {
    let dir = tempfile::tempdir().unwrap();
    let oversized = MAX_OUTPUT_BYTES + 1024 * 1024;
    let tool = fake_tool(
        dir.path(),
        "expocli",
        &format!(r"head -c {oversized} /dev/zero | tr '\0' x; echo done >&2"),
    );

    let out = process::run(&tool, &["SELECT *"], Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(out.stdout.len(), MAX_OUTPUT_BYTES);
    assert!(out.stdout.bytes().all(|b| b == b'x'));
    assert_eq!(out.stderr, "done\n");
    assert_eq!(out.exit_code, Some(0));
}

#[tokio::test]
async fn test_missing_executable_reports_path_and_install_hint() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("expocli");

    let result = executor(&missing).execute("SELECT 1").await;

    assert!(!result.success);
    assert_eq!(result.output, "");
    let error = result.error.unwrap();
    assert!(error.contains(&missing.display().to_string()));
    assert!(error.contains("install.sh"));
}

#[tokio::test]
async fn test_non_executable_file_is_unexpected_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expocli");
    std::fs::write(&path, "not a program").unwrap();

    let result = executor(&path).execute("SELECT 1").await;

    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Unexpected error:"));
}

#[tokio::test]
async fn test_working_directory_is_inherited() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "pwd");

    let result = executor(&tool).execute("SELECT 1").await;

    let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
    let reported = Path::new(result.output.trim()).canonicalize().unwrap();
    assert_eq!(reported, cwd);
}

#[tokio::test]
async fn test_concurrent_queries_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", r#"sleep 0.2; echo "$1""#);
    let executor = executor(&tool);

    let (a, b) = tokio::join!(executor.execute("first"), executor.execute("second"));

    assert_eq!(a, ExecutionResult::success("first\n"));
    assert_eq!(b, ExecutionResult::success("second\n"));
}

#[tokio::test]
async fn test_executor_usable_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(
        dir.path(),
        "expocli",
        r#"if [ "$1" = "bad" ]; then exit 1; fi; echo ok"#,
    );
    let executor = executor(&tool);

    assert!(!executor.execute("bad").await.success);
    assert_eq!(executor.execute("good").await, ExecutionResult::success("ok\n"));
}
