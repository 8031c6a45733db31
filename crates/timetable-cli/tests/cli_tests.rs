use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use std::io::Write;

const BIN_NAME: &str = "timetable";

fn timetable() -> Command {
    Command::cargo_bin(BIN_NAME).expect("binary exists")
}

const LINEAR_FLAGS: [&str; 11] = [
    "build",
    "--algorithm",
    "linear",
    "--amount",
    "12000",
    "--rate",
    "12",
    "--starts-at",
    "2016-01-15",
    "--duration",
    "12",
];

#[test]
fn cli_version_prints_binary_name() {
    timetable()
        .arg("version")
        .assert()
        .success()
        .stdout(contains("timetable"));
}

#[test]
fn cli_build_from_flags_prints_envelope() {
    timetable()
        .args(LINEAR_FLAGS)
        .assert()
        .success()
        .stdout(contains("\"timetable\"").and(contains("\"methodology\"")));
}

#[test]
fn cli_build_minimal_prints_total_interests() {
    timetable()
        .args(LINEAR_FLAGS)
        .args(["--output", "minimal"])
        .assert()
        .success()
        .stdout(contains("780"));
}

#[test]
fn cli_build_csv_has_one_row_per_term() {
    let output = timetable()
        .args(LINEAR_FLAGS)
        .args(["--output", "csv"])
        .output()
        .expect("command runs");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 13, "header plus twelve terms");
    assert!(lines[0].contains("due_date"));
    assert!(stdout.contains("2016-02-15"));
}

#[test]
fn cli_build_table_output() {
    timetable()
        .args(LINEAR_FLAGS)
        .args(["--output", "table"])
        .assert()
        .success()
        .stdout(contains("terms").and(contains("Methodology")));
}

#[test]
fn cli_build_requires_amount_without_input() {
    timetable()
        .args(["build", "--algorithm", "standard", "--rate", "5"])
        .assert()
        .failure()
        .stderr(contains("--amount is required"));
}

#[test]
fn cli_build_rejects_unknown_algorithm() {
    timetable()
        .args(["build", "--algorithm", "balloon"])
        .assert()
        .failure();
}

#[test]
fn cli_build_from_input_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{
            "algorithm": "bullet",
            "amount": "10000000",
            "annual_interest_rate": "10",
            "starts_at": "2016-01-15",
            "duration_in_periods": 48
        }}"#
    )
    .expect("write request");

    timetable()
        .args(["build", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("\"bullet\""));
}

#[test]
fn cli_build_from_stdin() {
    timetable()
        .arg("build")
        .write_stdin(
            r#"{"algorithm": "in_fine", "amount": "1000", "annual_interest_rate": "5",
                "starts_at": "2016-01-15", "duration_in_periods": 12}"#,
        )
        .args(["--output", "minimal"])
        .assert()
        .success()
        .stdout(contains("50"));
}

#[test]
fn cli_build_reports_invalid_parameters() {
    timetable()
        .args([
            "build",
            "--algorithm",
            "uncapitalized-bullet",
            "--amount",
            "1000",
            "--rate",
            "5",
            "--starts-at",
            "2016-01-15",
            "--duration",
            "12",
            "--deferred",
            "2",
        ])
        .assert()
        .failure()
        .stderr(contains("error"));
}

#[test]
fn cli_lenders_prints_borrower() {
    timetable()
        .args([
            "lenders",
            "--algorithm",
            "standard",
            "--amount",
            "100000",
            "--rate",
            "4",
            "--starts-at",
            "2020-06-30",
            "--duration",
            "24",
            "--shares",
            "60000,40000",
        ])
        .assert()
        .success()
        .stdout(contains("\"borrower\"").and(contains("\"lenders\"")));
}

#[test]
fn cli_validate_dates_accepts_increasing_dates() {
    timetable()
        .args([
            "validate-dates",
            "--algorithm",
            "linear",
            "--duration",
            "3",
            "--dates",
            "2020-01-10,2020-04-02,2020-06-30",
        ])
        .assert()
        .success()
        .stdout(contains("\"valid\": true"));
}

#[test]
fn cli_validate_dates_rejects_bullet_gap() {
    timetable()
        .args([
            "validate-dates",
            "--algorithm",
            "bullet",
            "--duration",
            "2",
            "--dates",
            "2019-01-01,2020-01-01,2021-01-03",
        ])
        .assert()
        .failure()
        .stderr(contains("368 days apart"));
}
