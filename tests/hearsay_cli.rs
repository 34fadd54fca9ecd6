use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn hearsay_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_hearsay").expect("hearsay test binary not built")
}

fn models_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_hearsay-models").expect("hearsay-models test binary not built")
}

#[test]
fn hearsay_help_mentions_transcription() {
    let output = Command::new(hearsay_bin())
        .arg("--help")
        .output()
        .expect("run hearsay --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("transcription"));
    assert!(combined.contains("--gate-rms"));
}

#[test]
fn hearsay_lists_injected_test_devices() {
    let output = Command::new(hearsay_bin())
        .arg("--list-input-devices")
        .env("HEARSAY_TEST_DEVICES", "Built-in Mic, USB Mic")
        .output()
        .expect("run hearsay --list-input-devices");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Available audio input devices:"));
    assert!(combined.contains("Built-in Mic"));
    assert!(combined.contains("USB Mic"));
}

#[test]
fn hearsay_list_models_on_empty_dir_points_at_setup() {
    let dir = tempfile::tempdir().expect("create temp models dir");
    let output = Command::new(hearsay_bin())
        .arg("--list-models")
        .arg("--models-dir")
        .arg(dir.path())
        .output()
        .expect("run hearsay --list-models");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("No models installed"));
    assert!(combined.contains("hearsay-models"));
}

#[test]
fn hearsay_rejects_out_of_range_gate() {
    let output = Command::new(hearsay_bin())
        .args(["--gate-rms", "99999", "--list-models"])
        .output()
        .expect("run hearsay with bad gate");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--gate-rms"));
}

#[test]
fn models_list_prints_catalog_table() {
    let dir = tempfile::tempdir().expect("create temp models dir");
    let output = Command::new(models_bin())
        .args(["--models-dir"])
        .arg(dir.path())
        .arg("list")
        .output()
        .expect("run hearsay-models list");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Available Models:"));
    assert!(combined.contains("en-us-small"));
    assert!(combined.contains("ja-large"));
}

#[test]
fn models_fetch_without_targets_fails() {
    let dir = tempfile::tempdir().expect("create temp models dir");
    let output = Command::new(models_bin())
        .args(["--models-dir"])
        .arg(dir.path())
        .arg("fetch")
        .output()
        .expect("run hearsay-models fetch");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("no valid models selected"));
}
