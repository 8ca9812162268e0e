use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_doctrack"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "doctrack init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".doctrack.toml");
    assert!(config_path.exists(), ".doctrack.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("tags = [\"doc-track\"]"));
    assert!(content.contains("fail_status = 1"));

    let config: doctrack_core::DocTrackConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.tags, vec!["doc-track"]);
    assert!(config.skip_blank_lines);
    assert!(config.markers().is_ok());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".doctrack.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_doctrack"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".doctrack.toml")).unwrap();
    assert_eq!(content, "# existing");
}

#[test]
fn no_subcommand_prints_welcome() {
    let output = Command::new(env!("CARGO_BIN_EXE_doctrack"))
        .args(["--color", "never"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("doctrack init"));
    assert!(!stdout.contains("\x1b["));
}
