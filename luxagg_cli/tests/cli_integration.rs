use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Fast ticks so real-time runs finish in milliseconds
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[sampling]
tick_ms = 1

[sensor]
kind = "sim"

[sensor.sim]
base_raw = 40
jitter_raw = 4
seed = 7

[aggregation]
collapse_max_std_dev = 20.0
passthrough_min_std_dev = 40.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_csv(dir: &tempfile::TempDir, name: &str, header: &str, rows: &[f32]) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "{header}").unwrap();
    for r in rows {
        writeln!(f, "{r}").unwrap();
    }
    path
}

fn alternating(lo: f32, hi: f32, n: usize) -> Vec<f32> {
    (0..n).map(|i| if i % 2 == 0 { lo } else { hi }).collect()
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check ok", "stdout")]
#[case(&["run", "--cycles", "1"], 0, "Aggregation: 12-into-1", "stdout")]
#[case(&["run", "--cycles", "1"], 0, "Light Reading 12:", "stdout")]
#[case(&["run", "--cycles", "1", "--tick-ms", "0"], 2, "tick-ms", "stderr")]
#[case(&["analyze"], 2, "--csv", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
#[case(vec![10.0; 12], "12-into-1", "X = [10.000]")]
#[case(alternating(20.0, 80.0, 12), "4-into-1", "X = [50.000, 50.000, 50.000]")]
#[case(alternating(0.0, 100.0, 12), "No aggregation", "X = [0.000, 100.000, 0.000")]
fn analyze_picks_scheme_by_dispersion(
    #[case] rows: Vec<f32>,
    #[case] label: &str,
    #[case] reduced: &str,
) {
    let dir = tempdir().unwrap();
    let csv = write_csv(&dir, "trace.csv", "lux", &rows);

    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("analyze").arg("--csv").arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!("Aggregation: {label}")))
        .stdout(predicate::str::contains(reduced))
        .stdout(predicate::str::contains("Light Reading").not());
}

#[test]
fn analyze_reports_every_complete_window() {
    let dir = tempdir().unwrap();
    let csv = write_csv(&dir, "trace.csv", "lux", &[5.0; 40]);

    let out = Command::cargo_bin("luxagg")
        .unwrap()
        .arg("analyze")
        .arg("--csv")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.matches("Aggregation:").count(), 3);
    assert!(stdout.contains("StdDev = 0.000"));
}

#[test]
fn bad_replay_header_exits_with_data_error() {
    let dir = tempdir().unwrap();
    let csv = write_csv(&dir, "bad.csv", "raw,lux", &[]);

    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("analyze").arg("--csv").arg(&csv);
    cmd.assert()
        .code(4)
        .stderr(predicate::str::contains("lux"));
}

#[test]
fn missing_replay_file_exits_with_data_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("analyze")
        .arg("--csv")
        .arg(dir.path().join("nope.csv"));
    cmd.assert().code(4);
}

#[test]
fn invalid_thresholds_exit_with_config_error() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        "[aggregation]\ncollapse_max_std_dev = 50.0\npassthrough_min_std_dev = 40.0\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("--config").arg(&cfg).arg("self-check");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("collapse_max_std_dev"));
}

#[test]
fn replay_run_stops_when_data_runs_out() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let csv = write_csv(&dir, "trace.csv", "lux", &[12.5; 26]);

    let out = Command::cargo_bin("luxagg")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--replay")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.matches("Aggregation: 12-into-1").count(), 2);
    assert!(stdout.contains("Light Reading 1: 12.50"));
    assert!(stdout.contains("X = [12.500]"));
}

#[test]
fn readings_above_ceiling_are_clamped_in_reports() {
    let dir = tempdir().unwrap();
    let csv = write_csv(&dir, "hot.csv", "lux", &[400.0; 12]);

    let mut cmd = Command::cargo_bin("luxagg").unwrap();
    cmd.arg("analyze").arg("--csv").arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("X = [150.000]"))
        .stderr(predicate::str::contains("clamped"));
}
