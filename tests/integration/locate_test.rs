//! Executable discovery integration tests.

use std::path::PathBuf;
use std::time::Duration;

use expocli_kernel::config::ExecutableConfig;
use expocli_kernel::executor::{locate, resolve};

use super::fake_tool;

const PROBE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_resolve_accepts_clean_exit() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "exit 0");

    assert_eq!(resolve(&[tool.clone()], PROBE, "expocli").await, Some(tool));
}

#[tokio::test]
async fn test_resolve_accepts_marker_despite_failure() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "echo 'ExpoCLI 0.9 (unknown flag)' >&2; exit 2");

    assert_eq!(resolve(&[tool.clone()], PROBE, "expocli").await, Some(tool));
}

#[tokio::test]
async fn test_resolve_skips_rejected_candidates_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let wrong = fake_tool(dir.path(), "other", "echo 'some other tool'; exit 1");
    let missing = dir.path().join("missing");
    let first_good = fake_tool(dir.path(), "good1", "echo 'expocli 1.0'");
    let second_good = fake_tool(dir.path(), "good2", "echo 'expocli 2.0'");

    let found = resolve(
        &[wrong, missing, first_good.clone(), second_good],
        PROBE,
        "expocli",
    )
    .await;

    assert_eq!(found, Some(first_good));
}

#[tokio::test]
async fn test_resolve_rejects_hanging_probe() {
    let dir = tempfile::tempdir().unwrap();
    let slow = fake_tool(dir.path(), "expocli", "exec sleep 30");

    let found = resolve(&[slow], Duration::from_millis(200), "expocli").await;

    assert_eq!(found, None);
}

#[tokio::test]
async fn test_locate_probes_configured_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let tool = fake_tool(dir.path(), "expocli", "echo 'ExpoCLI 1.0.0'");

    let config = ExecutableConfig {
        candidates: vec![
            dir.path().join("nope").display().to_string(),
            tool.display().to_string(),
        ],
        ..Default::default()
    };

    assert_eq!(locate(&config).await, tool);
}

#[tokio::test]
async fn test_locate_falls_back_when_nothing_answers() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExecutableConfig {
        candidates: vec![dir.path().join("expocli").display().to_string()],
        ..Default::default()
    };

    assert_eq!(locate(&config).await, PathBuf::from("expocli"));
}
