use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hourly_table"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run binary")
}

fn path_arg(p: &Path) -> &str {
    p.to_str().expect("temp path is not utf-8")
}

#[test]
fn test_cli_writes_three_rows() {
    let temp_dir = TempDir::new().unwrap();
    let csvout = temp_dir.path().join("dates.csv");

    let output = run(&[path_arg(&csvout), "2024-01-01T00:00:00", "2024-01-01T03:00:00"]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Creating a table of dates between 2024-01-01 00:00:00 and 2024-01-01 03:00:00"));
    assert!(stderr.contains("Completed. Created 3 rows."));
    assert_eq!(
        fs::read_to_string(&csvout).unwrap(),
        "Date\r\n2024-01-01 00:00:00\r\n2024-01-01 01:00:00\r\n2024-01-01 02:00:00\r\n"
    );
}

#[test]
fn test_cli_empty_range_writes_header() {
    let temp_dir = TempDir::new().unwrap();
    let csvout = temp_dir.path().join("dates.csv");

    let output = run(&[path_arg(&csvout), "2024-01-01", "2024-01-01"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Created 0 rows."));
    assert_eq!(fs::read_to_string(&csvout).unwrap(), "Date\r\n");
}

#[test]
fn test_cli_existing_file_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let csvout = temp_dir.path().join("dates.csv");
    fs::write(&csvout, "Date\r\nold\r\n").unwrap();

    let output = run(&[path_arg(&csvout), "2024-01-01", "2024-01-02"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(fs::read_to_string(&csvout).unwrap(), "Date\r\nold\r\n");
}

#[test]
fn test_cli_bad_date_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let csvout = temp_dir.path().join("dates.csv");

    let output = run(&[path_arg(&csvout), "2024-01-01", "tomorrow"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("tomorrow"));
    assert!(!csvout.exists());
}

#[test]
fn test_cli_missing_arguments() {
    let output = run(&["dates.csv"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<output_file>"));
    assert!(stdout.contains("--utc-offset"));
}
