use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "qnsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn qnsim(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_qnsim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run qnsim")
}

#[test]
fn demo_run_writes_tsv_and_report() {
    let dir = unique_temp_dir("demo");
    let records = dir.join("records.tsv");
    let queue = dir.join("queue.tsv");
    let report = dir.join("report.json");

    let output = qnsim(&[
        "--demo",
        "restricted-chain",
        "--validate",
        "--records-tsv",
        records.to_str().unwrap(),
        "--queue-tsv",
        queue.to_str().unwrap(),
        "--report-json",
        report.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "qnsim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("validation=ok"), "stdout={stdout}");
    assert!(stdout.contains("rejected_at_arrival=29"), "stdout={stdout}");

    let raw = fs::read_to_string(&records).expect("read records.tsv");
    assert!(raw.starts_with("Arrival Time\t"));
    let raw = fs::read_to_string(&queue).expect("read queue.tsv");
    assert!(raw.starts_with("Node\tTime\tQueue Length\n"));

    let raw = fs::read_to_string(&report).expect("read report.json");
    let v: Value = serde_json::from_str(&raw).expect("parse report.json");
    let served = v["Node01"]["service"]["count"].as_f64();
    assert_eq!(served, Some(90.0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_file_with_replications() {
    let dir = unique_temp_dir("scenario");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "nodes": [ { "id": "Desk", "servers": 2 } ],
    "cohorts": [ {
        "id": "visitors",
        "routing": { "kind": "random" },
        "nodes": { "Desk": {
            "arrivals": { "intervals": [ { "start": 0, "end": 500, "distribution": { "kind": "exponential", "rate": 0.1 } } ] },
            "service": { "intervals": [ { "start": 0, "end": 5000, "distribution": { "kind": "uniform", "min": 5, "max": 25 } } ] }
        } }
    } ]
}
        "#,
    );
    let report = dir.join("merged.json");

    let output = qnsim(&[
        "--scenario",
        scenario.to_str().unwrap(),
        "--iterations",
        "4",
        "--report-json",
        report.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "qnsim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("runs=4"), "stdout={stdout}");

    let raw = fs::read_to_string(&report).expect("read merged.json");
    let v: Value = serde_json::from_str(&raw).expect("parse merged.json");
    assert_eq!(v["Desk"]["service"]["count"]["count"].as_f64(), Some(4.0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_scenario_fails_with_message() {
    let dir = unique_temp_dir("invalid");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"{ "nodes": [ { "id": "A" } ], "cohorts": [ { "id": "c",
            "routing": { "kind": "chain", "path": ["A", "Missing"] }, "nodes": {} } ] }"#,
    );

    let output = qnsim(&["--scenario", scenario.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown node `Missing`"), "stderr={stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn scenario_and_demo_are_exclusive() {
    let output = qnsim(&["--demo", "single-node", "--scenario", "x.json"]);
    assert!(!output.status.success());
    let output = qnsim(&[]);
    assert!(!output.status.success());
}
