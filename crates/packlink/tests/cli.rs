#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

fn packlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_packlink"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("packlink should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let text = String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8");
    serde_json::from_str(text.trim()).expect("stdout should be JSON")
}

#[test]
fn simulate_writes_saved_preferences_to_the_prefs_file() {
    let path = std::env::temp_dir().join(format!("packlink-cli-prefs-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let prefs = path.to_str().expect("temp path should be UTF-8");

    let output = packlink(&[
        "--format",
        "json",
        "simulate",
        "--scenario",
        "prefs",
        "--duration-ms",
        "2000",
        "--prefs",
        prefs,
    ]);
    assert!(output.status.success(), "{output:?}");

    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).expect("prefs file should exist"))
            .expect("prefs file should be JSON");
    let _ = std::fs::remove_file(&path);
    assert_eq!(saved["pack"]["default_system_volume"], 50);
}

#[test]
fn simulate_boot_reports_connected_links() {
    let output = packlink(&[
        "--format",
        "json",
        "simulate",
        "--scenario",
        "boot",
        "--duration-ms",
        "500",
    ]);
    assert!(output.status.success(), "{output:?}");

    let report = stdout_json(&output);
    assert_eq!(report["scenario"], "boot");
    assert_eq!(report["elapsed_ms"], 500);
    let nodes = report["nodes"].as_array().expect("nodes should be an array");
    assert_eq!(nodes.len(), 3);
    for node in nodes {
        for link in node["links"].as_array().expect("links should be an array") {
            assert_eq!(link["state"], "connected", "{node}");
        }
    }
    assert_eq!(nodes[0]["mirror"]["wand_connected"], true);
    assert_eq!(nodes[2]["mirror"]["pack_connected"], true);
}

#[test]
fn simulate_unplug_reports_the_timeout() {
    let output = packlink(&[
        "--format",
        "json",
        "simulate",
        "--scenario",
        "unplug",
        "--duration-ms",
        "10000",
    ]);
    assert!(output.status.success(), "{output:?}");

    let report = stdout_json(&output);
    let pack = &report["nodes"][0];
    assert_eq!(pack["mirror"]["wand_connected"], false);
    assert_eq!(pack["mirror"]["wand_firing"], false);
    assert_eq!(pack["links"][0]["peer"], "wand");
    assert_eq!(pack["links"][0]["stats"]["timeouts"], 1);
}

#[test]
fn simulate_table_output_lists_every_node() {
    let output = packlink(&["--format", "table", "simulate", "--duration-ms", "200"]);
    assert!(output.status.success(), "{output:?}");
    let text = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    for needle in ["pack", "wand", "attenuator", "wand_connected", "TIMEOUTS"] {
        assert!(text.contains(needle), "missing {needle} in:\n{text}");
    }
}

#[test]
fn unknown_command_name_is_a_usage_error() {
    let output = packlink(&[
        "send",
        "/dev/null",
        "--from",
        "wand",
        "--command",
        "P_SYNC_START",
    ]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown command"), "{stderr}");
}

#[test]
fn missing_device_is_a_transport_error() {
    let output = packlink(&[
        "send",
        "/dev/packlink-no-such-tty",
        "--from",
        "wand",
        "--command",
        "W_SYNC_NOW",
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn peripherals_cannot_address_each_other() {
    let output = packlink(&[
        "monitor",
        "/dev/null",
        "--from",
        "wand",
        "--to",
        "attenuator",
    ]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_extended_lists_build_target() {
    let output = packlink(&["version", "--extended"]);
    assert!(output.status.success(), "{output:?}");
    let text = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(text.contains("name: packlink"));
    assert!(text.contains("target: "));
    assert!(text.contains("heartbeat=3250"));
}
