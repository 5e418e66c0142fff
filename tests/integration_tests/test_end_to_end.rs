// client -> HTTP server -> real external process

use crate::common::*;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use simctl_bridge::actions::{
    Action, ActionKind, BatteryLevel, BatteryState, CellularBars, Command, DeviceAppearance,
    PrivacyAction, PrivacyService, PushNotificationContent, StatusBarOverrides, WifiBars,
};
use simctl_bridge::client::ClientError;
use simctl_bridge::server::Router;

// ============================================================================
// echo as the tool
// ============================================================================

#[tokio::test]
async fn test_rename_device_echoes_udid_and_name() {
    let server = start_simctl_server(tool("echo", &["simctl"])).await;
    let client = client_for(&server);

    let output = client.rename_device("Test").await.unwrap();

    let tokens: Vec<&str> = output.split_whitespace().collect();
    assert_eq!(tokens, vec!["simctl", "rename", TEST_UDID, "Test"]);
    assert_eq!(&tokens[tokens.len() - 2..], &[TEST_UDID, "Test"]);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_padded_device_name_reaches_tool_intact() {
    let server = start_simctl_server(tool("echo", &[])).await;
    let client = client_for(&server);

    let output = client.rename_device("  Padded Name  ").await.unwrap();

    // echo joins its arguments with single spaces
    assert_eq!(output, format!("rename {}   Padded Name  \n", TEST_UDID));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_every_get_operation_reaches_tool() {
    let server = start_simctl_server(tool("echo", &[])).await;
    let client = client_for(&server);

    assert_eq!(
        client
            .set_privacy(PrivacyAction::Grant, PrivacyService::PhotosAdd)
            .await
            .unwrap(),
        format!("privacy {} grant photos-add {}\n", TEST_UDID, TEST_BUNDLE_ID)
    );
    assert_eq!(
        client.terminate_app("com.apple.Preferences").await.unwrap(),
        format!("terminate {} com.apple.Preferences\n", TEST_UDID)
    );
    assert_eq!(
        client
            .set_device_appearance(DeviceAppearance::Dark)
            .await
            .unwrap(),
        format!("ui {} appearance dark\n", TEST_UDID)
    );
    assert_eq!(
        client.trigger_icloud_sync().await.unwrap(),
        format!("icloud_sync {}\n", TEST_UDID)
    );
    assert_eq!(
        client.uninstall_app("com.example.Other").await.unwrap(),
        format!("uninstall {} com.example.Other\n", TEST_UDID)
    );
    assert_eq!(
        client.clear_status_bar_overrides().await.unwrap(),
        format!("status_bar {} clear\n", TEST_UDID)
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_post_operations_reach_tool() {
    let server = start_simctl_server(tool("echo", &[])).await;
    let client = client_for(&server);

    let overrides = StatusBarOverrides::new()
        .time("9:41")
        .wifi_bars(WifiBars::try_from(3).unwrap())
        .operator_name("Carrier X");
    assert_eq!(
        client.set_status_bar_overrides(overrides).await.unwrap(),
        format!(
            "status_bar {} override --time 9:41 --wifiBars 3 --operatorName Carrier X\n",
            TEST_UDID
        )
    );

    let url = reqwest::Url::parse("myapp://open?item=1").unwrap();
    assert_eq!(
        client.open_url(url).await.unwrap(),
        format!("openurl {} myapp://open?item=1\n", TEST_UDID)
    );

    let file = PushNotificationContent::File("/tmp/payload.apns".into());
    assert_eq!(
        client.send_push_notification(file).await.unwrap(),
        format!("push {} {} /tmp/payload.apns\n", TEST_UDID, TEST_BUNDLE_ID)
    );

    server.stop().await.unwrap();
}

// ============================================================================
// actions survive the HTTP transport unchanged
// ============================================================================

/// one action per kind, with strings HTTP would otherwise mangle
fn awkward_actions() -> Vec<Action> {
    let udid = uuid::Uuid::parse_str(TEST_UDID).unwrap();
    let bundle = Some(" com.example.TestApp ".to_string());
    let commands = vec![
        Command::SendPushNotification(PushNotificationContent::File(
            "/Users/jürgen/push payload.apns".into(),
        )),
        Command::SetPrivacy {
            action: PrivacyAction::Revoke,
            service: PrivacyService::PhotosAdd,
        },
        Command::RenameDevice {
            name: "  Padded Name \t100% ✓ ".into(),
        },
        Command::TerminateApp {
            bundle_identifier: "com.example.Tab\tbed ".into(),
        },
        Command::SetDeviceAppearance(DeviceAppearance::Light),
        Command::TriggerICloudSync,
        Command::UninstallApp {
            bundle_identifier: "\r\ncom.example.Other".into(),
        },
        Command::SetStatusBarOverrides(
            StatusBarOverrides::new()
                .time(" 9:41 ")
                .operator_name("  Carrier\nX  ")
                .cellular_bars(CellularBars::try_from(4).unwrap())
                .battery_state(BatteryState::Discharging)
                .battery_level(BatteryLevel::try_from(0).unwrap()),
        ),
        Command::ClearStatusBarOverrides,
        Command::OpenUrl {
            url: reqwest::Url::parse("myapp://open?item=a%20b").unwrap(),
        },
    ];
    commands
        .into_iter()
        .map(|command| Action::new(udid, bundle.clone(), command))
        .collect()
}

#[tokio::test]
async fn test_every_kind_roundtrips_over_http() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    for kind in ActionKind::ALL {
        let seen = seen.clone();
        router
            .register(kind, move |action| {
                seen.lock().unwrap().push(action);
                Ok(String::new())
            })
            .unwrap();
    }
    let server = start_server(router).await;
    let client = client_for(&server);

    let sent = awkward_actions();
    let kinds: HashSet<ActionKind> = sent.iter().map(Action::kind).collect();
    assert_eq!(kinds.len(), ActionKind::ALL.len());

    for action in &sent {
        client.send(action).await.unwrap();
    }

    assert_eq!(*seen.lock().unwrap(), sent);

    server.stop().await.unwrap();
}

// ============================================================================
// inline push payloads
// ============================================================================

#[tokio::test]
async fn test_inline_push_payload_has_no_newlines() {
    // print each argument followed by '|', then whatever arrives on stdin
    let server = start_simctl_server(tool("sh", &["-c", r#"printf '%s|' "$@"; cat"#, "sh"])).await;
    let client = client_for(&server);

    let payload = b"{\n  \"aps\": {\n    \"alert\": \"Hello\"\n  }\n}\n".to_vec();
    let output = client
        .send_push_notification(PushNotificationContent::JsonPayload(payload))
        .await
        .unwrap();

    assert!(!output.contains('\n'), "output: {:?}", output);
    assert_eq!(
        output,
        format!(
            r#"push|{}|{}|-|{{  "aps": {{    "alert": "Hello"  }}}}"#,
            TEST_UDID, TEST_BUNDLE_ID
        )
    );

    server.stop().await.unwrap();
}

// ============================================================================
// routing and failures
// ============================================================================

#[tokio::test]
async fn test_unknown_path_is_404_and_invokes_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut router = Router::new();
    for kind in ActionKind::ALL {
        let calls = calls.clone();
        router
            .register(kind, move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(String::new())
            })
            .unwrap();
    }
    let server = start_server(router).await;

    let response = reqwest::Client::new()
        .get(format!(
            "http://127.0.0.1:{}/simctl/notARoute",
            server.local_addr().port()
        ))
        .header("device_udid", TEST_UDID)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert!(response.text().await.unwrap().contains("unknown route"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_header_is_400() {
    let server = start_simctl_server(tool("echo", &[])).await;

    let response = reqwest::Client::new()
        .get(format!(
            "http://127.0.0.1:{}/simctl/renameDevice",
            server.local_addr().port()
        ))
        .header("device_udid", TEST_UDID)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert!(response.text().await.unwrap().contains("device_name"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_tool_failure_reaches_client() {
    let server =
        start_simctl_server(tool("sh", &["-c", "echo boom >&2; exit 3", "sh"])).await;
    let client = client_for(&server);

    let err = client.rename_device("Test").await.unwrap_err();
    match err {
        ClientError::UnexpectedStatusCode {
            route,
            status,
            body,
        } => {
            assert_eq!(route, ActionKind::RenameDevice.route());
            assert_eq!(status, 400);
            assert!(body.contains("boom"), "body: {}", body);
            assert!(body.contains('3'), "body: {}", body);
        }
        other => panic!("expected UnexpectedStatusCode, got {:?}", other),
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_send_decoded_parses_json_output() {
    let server = start_simctl_server(tool("sh", &["-c", r#"printf '{"ok":true}'"#, "sh"])).await;
    let client = client_for(&server);

    let action = client.action(simctl_bridge::actions::Command::TriggerICloudSync);
    let value: serde_json::Value = client.send_decoded(&action).await.unwrap();
    assert_eq!(value, serde_json::json!({"ok": true}));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_send_decoded_empty_output_is_no_data() {
    let server = start_simctl_server(tool("true", &[])).await;
    let client = client_for(&server);

    let action = client.action(simctl_bridge::actions::Command::TriggerICloudSync);
    let err = client
        .send_decoded::<serde_json::Value>(&action)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NoData), "got {:?}", err);

    server.stop().await.unwrap();
}

// ============================================================================
// concurrency and lifecycle
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_requests_run_concurrently() {
    let server = start_simctl_server(tool("sh", &["-c", "sleep 0.5; echo \"$@\"", "sh"])).await;
    let client = Arc::new(client_for(&server));

    let started = Instant::now();
    let mut tasks = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.rename_device(format!("Device {}", i)).await
        }));
    }
    for (i, task) in tasks.into_iter().enumerate() {
        let output = task.await.unwrap().unwrap();
        assert!(output.trim_end().ends_with(&format!("Device {}", i)));
    }

    // four sequential runs would take at least two seconds
    assert!(started.elapsed() < Duration::from_millis(1900));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_releases_port() {
    let server = start_simctl_server(tool("echo", &[])).await;
    let addr = server.local_addr();

    server.stop().await.unwrap();

    let listener = tokio::net::TcpListener::bind(addr).await;
    assert!(listener.is_ok(), "port {} still in use", addr.port());
}
