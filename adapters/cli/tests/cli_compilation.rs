use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "overworld"])
        .status()
        .expect("failed to invoke cargo check for the overworld binary");

    assert!(status.success(), "cargo check --bin overworld should succeed");
}

#[test]
fn help_lists_map_and_tuning_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_overworld"))
        .arg("--help")
        .output()
        .expect("failed to run the overworld binary");

    assert!(output.status.success(), "--help should exit successfully");
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--map", "--config", "--generate", "--seed", "--columns", "--rows"] {
        assert!(help.contains(flag), "help output should mention {flag}:\n{help}");
    }
    assert!(help.contains("Walk a tile map"), "help should describe the game:\n{help}");
}
