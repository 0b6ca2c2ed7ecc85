use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn learnora() -> Command {
    Command::cargo_bin("learnora").unwrap()
}

#[test]
fn test_cli_help() {
    learnora()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_search_fails_without_corpus() {
    let root = tempdir().unwrap();
    learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["search", "rust"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resource missing"));
}

#[test]
fn test_search_failure_is_machine_readable_in_robot_mode() {
    let root = tempdir().unwrap();
    let output = learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["--robot", "--quiet", "search", "rust"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let error: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(error["error"], true);
    assert_eq!(error["code"], "resource_missing");
}

#[test]
fn test_share_save_and_get_round_trip() {
    let root = tempdir().unwrap();
    let payload_path = root.path().join("payload.json");
    std::fs::write(
        &payload_path,
        r#"{"query": "learn rust", "steps": [{"step": 1, "label": "Foundations"}]}"#,
    )
    .unwrap();

    let saved = learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["--robot", "--quiet", "share", "save"])
        .arg(&payload_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let receipt: Value = serde_json::from_slice(&saved).unwrap();
    let share_id = receipt["share_id"].as_str().unwrap();
    assert_eq!(share_id.len(), 8);
    assert_eq!(receipt["query"], "learn rust");

    learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["--robot", "--quiet", "share", "get", share_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("learn rust"));
}

#[test]
fn test_share_get_unknown_id_fails() {
    let root = tempdir().unwrap();
    learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["share", "get", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_share_save_rejects_non_object_payload() {
    let root = tempdir().unwrap();
    let payload_path = root.path().join("payload.json");
    std::fs::write(&payload_path, "[1, 2, 3]").unwrap();

    learnora()
        .env("LEARNORA_ROOT", root.path())
        .args(["share", "save"])
        .arg(&payload_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}
