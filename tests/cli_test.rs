use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_pipeline(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_check_dag() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pipeline(
        &temp_dir,
        "dag.json",
        r#"{"nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "edges": [{"source": "A", "target": "B"}, {"source": "B", "target": "C"}]}"#,
    );

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("check").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 3"))
        .stdout(predicate::str::contains("Edges: 2"))
        .stdout(predicate::str::contains("Is DAG: true"))
        .stdout(predicate::str::contains("Cycle").not());
}

#[test]
fn test_check_cycle_exits_with_two() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pipeline(
        &temp_dir,
        "cycle.json",
        r#"{"nodes": [{"id": "A"}, {"id": "B"}],
            "edges": [{"source": "A", "target": "B"}, {"source": "B", "target": "A"}]}"#,
    );

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("check").arg(&path);
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("Is DAG: false"))
        .stdout(predicate::str::contains("Cycle: A → B → A"));
}

#[test]
fn test_check_json_from_stdin() {
    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.args(["check", "-", "--json"]);
    cmd.write_stdin(r#"{"nodes": [{"id": 1}], "edges": [{"source": 1, "target": 1}]}"#);
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains(r#""is_dag": false"#))
        .stdout(predicate::str::contains(r#""cycle""#));
}

#[test]
fn test_check_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("check").arg(temp_dir.path().join("nope.json"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: IO error"));
}

#[test]
fn test_history_unknown_client() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("history.db");

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("history").arg("ghost").arg("--db").arg(&db);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No submissions found for client 'ghost'"));
}

#[test]
fn test_clear_unknown_client() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("history.db");

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("clear").arg("ghost").arg("--db").arg(&db);
    cmd.assert().failure();
}

#[test]
fn test_history_after_submission() {
    use pipedag::config::Limits;
    use pipedag::core::PipelineService;

    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("history.db");

    {
        let service = PipelineService::open_at(&db, Limits::default()).unwrap();
        let request = serde_json::from_str(
            r#"{"client_id": "c1", "nodes": [{"id": "A"}, {"id": "B"}],
                "edges": [{"source": "A", "target": "B"}]}"#,
        )
        .unwrap();
        service.parse_pipeline(request).unwrap();
    }

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("history").arg("c1").arg("--db").arg(&db);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Client c1: 1 version(s)"))
        .stdout(predicate::str::contains("nodes=2"))
        .stdout(predicate::str::contains("DAG"));

    let mut cmd = Command::cargo_bin("pipedag").unwrap();
    cmd.arg("clear").arg("c1").arg("--db").arg(&db);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 version(s)"));
}
