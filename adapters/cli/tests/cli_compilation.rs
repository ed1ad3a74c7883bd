use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "escape-the-maze"])
        .status()
        .expect("failed to invoke cargo check for escape-the-maze CLI binary");

    assert!(status.success(), "cargo check --bin escape-the-maze should succeed");
}

#[test]
fn help_lists_every_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_escape-the-maze"))
        .arg("--help")
        .output()
        .expect("failed to run escape-the-maze --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--seed",
        "--debug",
        "--data-file",
        "--config",
        "--log-file",
        "--username",
        "--mute",
    ] {
        assert!(help.contains(flag), "{flag} missing from --help");
    }
}
