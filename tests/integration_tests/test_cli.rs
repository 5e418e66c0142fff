// integration tests for the simctl-bridge binary

use crate::common::*;

use simctl_bridge::cli::exit_codes;
use tempfile::TempDir;

// ============================================================================
// config tests
// ============================================================================

#[test]
fn test_config_path_honors_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.json");

    let output = run_bridge(&path, &["config", "path"]);

    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim(), path.display().to_string());
}

#[test]
fn test_config_show_missing_file_prints_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let output = run_bridge(&path, &["config", "show"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let config: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(config["server"]["port"], 8080);
    assert_eq!(config["server"]["bind_address"], "127.0.0.1");
    assert_eq!(config["tool"]["program"], "xcrun");
    assert!(!path.exists(), "config show must not create the file");
}

#[test]
fn test_config_show_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        &serde_json::json!({"server": {"port": 9999}, "tool": {"program": "echo", "args": []}}),
    );

    let output = run_bridge(&path, &["config", "show"]);

    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(config["server"]["port"], 9999);
    assert_eq!(config["tool"]["program"], "echo");
    assert_eq!(config["tool"]["args"], serde_json::json!([]));
}

#[test]
fn test_config_default_is_valid_json() {
    let dir = TempDir::new().unwrap();
    let output = run_bridge(&dir.path().join("c.json"), &["config", "default"]);

    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(config["tool"]["args"], serde_json::json!(["simctl"]));
}

#[test]
fn test_invalid_config_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let output = run_bridge(&path, &["config", "show"]);

    assert_eq!(output.status.code(), Some(exit_codes::CONFIG_ERROR));
    assert!(stderr_of(&output).contains("config.json"));
}

#[test]
fn test_config_verify_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        &serde_json::json!({"server": {"bind_address": "not-an-ip"}, "tool": {"program": ""}}),
    );

    let output = run_bridge(&path, &["config", "verify"]);

    assert!(!output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("2 error(s)"), "stdout: {}", stdout);
    assert!(stdout.contains("server.bind_address"));
    assert!(stdout.contains("tool.program"));
}

#[test]
fn test_config_verify_valid_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &serde_json::json!({}));

    let output = run_bridge(&path, &["config", "verify"]);

    assert!(output.status.success());
    assert!(stdout_of(&output).contains("valid"));
}

// ============================================================================
// list-devices tests
// ============================================================================

/// config whose tool prints the fixture listing
fn listing_config(dir: &TempDir) -> std::path::PathBuf {
    let fixture = dir.path().join("devices.json");
    std::fs::write(&fixture, DEVICE_LISTING).unwrap();
    write_config(
        dir.path(),
        &serde_json::json!({
            "tool": {
                "program": "sh",
                "args": ["-c", "cat \"$0\"", fixture.to_string_lossy()]
            }
        }),
    )
}

#[test]
fn test_list_devices_text() {
    let dir = TempDir::new().unwrap();
    let path = listing_config(&dir);

    let output = run_bridge(&path, &["list-devices"]);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let lines: Vec<String> = stdout_of(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            format!("<SimulatorDevice[{}]: iPhone 15 (Booted)>", TEST_UDID),
            "<SimulatorDevice[5B7E2C44-1D3A-4F0B-9C62-88E1A0D3F7B2]: iPhone SE (3rd generation) (Shutdown)>"
                .to_string(),
        ]
    );
}

#[test]
fn test_list_devices_json() {
    let dir = TempDir::new().unwrap();
    let path = listing_config(&dir);

    let output = run_bridge(&path, &["list-devices", "--json"]);

    assert!(output.status.success());
    let devices: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let devices = devices.as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["name"], "iPhone 15");
    assert_eq!(devices[0]["state"], "Booted");
    assert_eq!(devices[0]["isAvailable"], true);
}

#[test]
fn test_list_devices_tool_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        &serde_json::json!({"tool": {"program": "sh", "args": ["-c", "echo no xcode >&2; exit 72"]}}),
    );

    let output = run_bridge(&path, &["list-devices"]);

    assert_eq!(output.status.code(), Some(exit_codes::TOOL_FAILED));
    assert!(stderr_of(&output).contains("no xcode"));
}

// ============================================================================
// start-server tests
// ============================================================================

#[test]
fn test_start_server_bind_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &serde_json::json!({}));
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port().to_string();

    let output = run_bridge(&path, &["start-server", "--port", &port]);

    assert_eq!(output.status.code(), Some(exit_codes::BIND_FAILED));
    assert!(stderr_of(&output).contains(&port));
}

#[test]
fn test_invalid_port_is_invalid_args() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), &serde_json::json!({}));

    let output = run_bridge(&path, &["start-server", "--port", "not-a-port"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGS));
}
