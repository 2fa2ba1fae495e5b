//! End-to-end session tests: JSON-lines in, protocol messages out, with a
//! real subprocess behind the kernel.

use std::sync::Arc;
use std::time::Duration;

use expocli_kernel::executor::QueryExecutor;
use expocli_kernel::kernel::Kernel;
use expocli_kernel::session::Session;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::fake_tool;

async fn run_session(tool: &std::path::Path, input: &str) -> Vec<Value> {
    let executor = QueryExecutor::new(tool, Duration::from_secs(10));
    let mut session = Session::new(Kernel::new(Arc::new(executor)));

    let mut out: Vec<u8> = Vec::new();
    session.run(input.as_bytes(), &mut out).await.unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn execute_line(code: &str) -> String {
    format!(
        "{}\n",
        json!({"msg_type": "execute_request", "content": {"code": code}})
    )
}

#[tokio::test]
async fn test_books_query_displays_output() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", r#"echo "Alice | 35""#);

    let out = run_session(
        &tool,
        &execute_line("SELECT name FROM examples/books.xml WHERE price > 30"),
    )
    .await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["msg_type"], "display_data");
    assert_eq!(out[0]["content"]["data"]["text/plain"], "Alice | 35\n");
    assert_eq!(out[1]["msg_type"], "execute_reply");
    assert_eq!(out[1]["content"]["status"], "ok");
}

#[tokio::test]
async fn test_magic_never_spawns() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let tool = fake_tool(
        dir.path(),
        "expocli",
        &format!("touch {}", marker.display()),
    );

    let out = run_session(&tool, &execute_line("%set_xsd schema.xsd")).await;

    assert!(!marker.exists());
    assert_eq!(out[0]["msg_type"], "stream");
    assert_eq!(out[0]["content"]["name"], "stdout");
    assert!(out[0]["content"]["text"]
        .as_str()
        .unwrap()
        .contains("not yet implemented"));
    assert_eq!(out[1]["content"]["status"], "ok");
}

#[tokio::test]
async fn test_failed_query_error_reply() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "echo 'Syntax error' >&2; exit 1");

    let out = run_session(&tool, &execute_line("SELEC oops")).await;

    assert_eq!(
        out,
        vec![
            json!({
                "msg_type": "stream",
                "content": {"name": "stderr", "text": "Syntax error\n"}
            }),
            json!({
                "msg_type": "execute_reply",
                "content": {
                    "status": "error",
                    "execution_count": 1,
                    "ename": "ExpoCLIError",
                    "evalue": "Syntax error\n",
                    "traceback": ["Syntax error\n"]
                }
            }),
        ]
    );
}

#[tokio::test]
async fn test_multiple_requests_share_counter() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", r#"echo "$1""#);

    let input = format!("{}{}", execute_line("one"), execute_line("two"));
    let out = run_session(&tool, &input).await;

    assert_eq!(out.len(), 4);
    assert_eq!(out[1]["content"]["execution_count"], 1);
    assert_eq!(out[3]["content"]["execution_count"], 2);
    assert_eq!(out[2]["content"]["data"]["text/plain"], "two\n");
}
