//! CLI integration tests

use std::collections::HashSet;
use std::io::Write;
use std::process::{Command, Stdio};

fn wattcast(args: &[&str]) -> Command {
    let mut command = Command::new("cargo");
    command.args(["run", "-p", "wattcast-cli", "--quiet", "--"]);
    command.args(args);
    command
}

/// Multi-entity training CSV: three meters, one hundred rows each.
fn multi_entity_csv() -> String {
    let mut csv = String::from("ObjectId,Month,Day,Hour,TempOutside,TempInside,Consumption\n");
    for (i, id) in ["meter-a", "meter-b", "meter-c"].iter().enumerate() {
        for row in 0..100 {
            let month = row % 12 + 1;
            let day = row % 28 + 1;
            let hour = row % 24;
            let consumption = 0.3 + i as f64 + hour as f64 * 0.05;
            csv.push_str(&format!(
                "{id},{month},{day},{hour},{:.1},{:.1},{consumption:.3}\n",
                5.0 - hour as f64 * 0.2,
                20.0 + i as f64,
            ));
        }
    }
    csv
}

fn decomposed_csv() -> String {
    let mut csv = String::from("Month,Day,Hour,ConsumptionKwh\n");
    for day in 1..=10 {
        for hour in 0..24 {
            let consumption = match hour {
                6..=8 => 1.5,
                17..=21 => 2.5,
                _ => 0.3,
            };
            csv.push_str(&format!("11,{day},{hour},{consumption:.3}\n"));
        }
    }
    csv
}

#[test]
fn test_cli_help() {
    let output = wattcast(&["--help"]).output().expect("failed to run CLI");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("--train"), "should show train option");
    assert!(stdout.contains("--predict"), "should show predict option");
    assert!(stdout.contains("--forecast"), "should show forecast option");
    assert!(stdout.contains("--model"), "should show model option");
    assert!(stdout.contains("WATTCAST_MODEL"), "should show env var");
}

#[test]
fn test_cli_version() {
    let output = wattcast(&["--version"]).output().expect("failed to run CLI");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("wattcast"), "should show binary name");
}

#[test]
fn test_predict_without_model_prints_diagnostic() {
    let output = wattcast(&["--predict"]).output().expect("failed to run CLI");

    // Missing-argument problems are diagnostics, not error exits.
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("model file is required"));
}

#[test]
fn test_forecast_with_bad_start_prints_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    let output = wattcast(&[
        "--forecast",
        "not-a-timestamp",
        "-m",
        model.to_str().unwrap(),
    ])
    .output()
    .expect("failed to run CLI");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid timestamp"));
}

#[test]
fn test_train_with_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("model.json");
    let output = wattcast(&[
        "-t",
        "/nonexistent/input.csv",
        model.to_str().unwrap(),
    ])
    .output()
    .expect("failed to run CLI");

    assert!(!output.status.success(), "missing training data is fatal");
}

#[test]
fn test_train_predict_round_trip_multi_entity() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let model = dir.path().join("model.json");
    std::fs::write(&input, multi_entity_csv()).unwrap();

    let output = wattcast(&[
        "-t",
        input.to_str().unwrap(),
        model.to_str().unwrap(),
        "--budget",
        "0.1",
    ])
    .output()
    .expect("failed to run CLI");
    assert!(
        output.status.success(),
        "training failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(model.exists(), "model artifact should be written");

    // The whitelist sidecar holds exactly the three distinct ids.
    let sidecar = dir.path().join("model.dat");
    let ids: HashSet<String> = std::fs::read_to_string(&sidecar)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(
        ids,
        HashSet::from(["meter-a".into(), "meter-b".into(), "meter-c".into()])
    );

    // Score a mix of valid, unknown-id and malformed lines.
    let mut child = wattcast(&["-p", "-m", model.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"meter-b,5,10,18\nmeter-x,5,10,18\n1,2\nmeter-a,abc,1,2\nmeter-c,1,1,1\n\nmeter-a,2,2,2\n")
        .unwrap();
    let scored = child.wait_with_output().expect("failed to wait for CLI");
    assert!(scored.status.success());

    let stdout = String::from_utf8_lossy(&scored.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    // Two known ids scored; the unknown id and the malformed lines produce
    // nothing, and the blank line ends the session before the final row.
    assert_eq!(lines.len(), 2, "unexpected output: {stdout}");
    assert!(lines[0].starts_with("meter-b,"));
    assert!(lines[1].starts_with("meter-c,"));

    let stderr = String::from_utf8_lossy(&scored.stderr);
    assert_eq!(
        stderr.matches("skipping input").count(),
        2,
        "each malformed line warns exactly once: {stderr}"
    );
}

#[test]
fn test_train_forecast_round_trip_single_entity() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let model = dir.path().join("model.json");
    std::fs::write(&input, decomposed_csv()).unwrap();

    let output = wattcast(&[
        "-t",
        input.to_str().unwrap(),
        model.to_str().unwrap(),
        "--budget",
        "0.1",
    ])
    .output()
    .expect("failed to run CLI");
    assert!(
        output.status.success(),
        "training failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    // Single-entity training writes no whitelist sidecar.
    assert!(!dir.path().join("model.dat").exists());

    let output = wattcast(&[
        "--forecast",
        "2024-11-21T15:00:00",
        "-n",
        "3",
        "-m",
        model.to_str().unwrap(),
    ])
    .output()
    .expect("failed to run CLI");
    assert!(
        output.status.success(),
        "forecast failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("(2024-11-21T16:00:00)"), "got: {}", lines[0]);
    assert!(lines[2].contains("(2024-11-21T18:00:00)"), "got: {}", lines[2]);
    for line in &lines {
        assert!(line.starts_with("Predicted consumption ("));
        assert!(line.ends_with("KWh"));
    }
}
