//! Integration test: the binary's command-line surface

use std::process::Command;

#[test]
fn binary_prints_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_hexview"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Expected output to contain the package version, but got: {}",
        stdout
    );
}

#[test]
fn binary_requires_a_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_hexview"))
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<FILE>"), "usage should name the file argument: {}", stderr);
}

#[test]
fn binary_reports_missing_file() {
    let dir = std::env::temp_dir().join(format!("hexview_missing_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = dir.join("config.toml");
    let log = dir.join("hexview.log");
    std::fs::write(&config, format!("log_file_path = {:?}\n", log.display().to_string())).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_hexview"))
        .arg("--config")
        .arg(&config)
        .arg(dir.join("does-not-exist.bin"))
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FileNotFound"), "unexpected stderr: {}", stderr);
    assert!(log.exists(), "logging should be initialized before the file is opened");

    let _ = std::fs::remove_dir_all(&dir);
}
