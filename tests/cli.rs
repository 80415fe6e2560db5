use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn write_speed_plot(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_write_speed_plot"))
        .args(args)
        .output()
        .expect("could not run write_speed_plot")
}

#[test]
fn plots_two_samples() {
    let dir = tempfile::tempdir().unwrap();
    let login = dir.path().join("write-benchmark-sdb.log");
    let imgout = dir.path().join("sdb.jpg");
    fs::write(&login, "1700000000 x 12.5\n1700000060 x 13.0\n").unwrap();

    let out = write_speed_plot(&[&login, &imgout]);

    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), format!("Wrote {}", imgout.display()));
    assert!(imgout.exists());
}

#[test]
fn no_data_points() {
    let dir = tempfile::tempdir().unwrap();
    let login = dir.path().join("noise.log");
    let imgout = dir.path().join("noise.jpg");
    fs::write(&login, "monitor start sdb 2023-11-14\n").unwrap();

    let out = write_speed_plot(&[&login, &imgout]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("No data points found."));
    assert!(out.stdout.is_empty());
    assert!(!imgout.exists());
}

#[test]
fn usage_on_wrong_argument_count() {
    let dir = tempfile::tempdir().unwrap();
    let login = dir.path().join("bench.log");

    let out = write_speed_plot(&[&login]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("USAGE"));
}

#[test]
fn missing_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let login = dir.path().join("missing.log");
    let imgout = dir.path().join("missing.jpg");

    let out = write_speed_plot(&[&login, &imgout]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error:"));
}

#[test]
fn unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let login = dir.path().join("bench.log");
    let imgout = dir.path().join("missing").join("out.jpg");
    fs::write(&login, "1700000000 x 12.5\n1700000060 x 13.0\n").unwrap();

    let out = write_speed_plot(&[&login, &imgout]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("Error:"));
    assert!(out.stdout.is_empty());
}
