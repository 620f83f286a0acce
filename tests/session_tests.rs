use std::process::Command;
use std::time::{Duration, Instant};

use locator_cache::agent::error::DriverError;
use locator_cache::browser::session::{BrowserRequest, BrowserResponse, BrowserSession};
use serde_json::json;

// ============================================================================
// Request encoding
// ============================================================================

#[test]
fn requests_are_tagged_by_cmd() {
    let fill = BrowserRequest::Fill {
        selector: "input#user-name".into(),
        value: "standard_user".into(),
    };
    assert_eq!(
        serde_json::to_value(&fill).unwrap(),
        json!({"cmd": "fill", "selector": "input#user-name", "value": "standard_user"})
    );

    let wait = BrowserRequest::WaitForSelector {
        selector: "text=Products".into(),
        timeout_ms: 5000,
    };
    assert_eq!(
        serde_json::to_value(&wait).unwrap(),
        json!({"cmd": "wait_for_selector", "selector": "text=Products", "timeout_ms": 5000})
    );

    assert_eq!(
        serde_json::to_value(BrowserRequest::CurrentUrl).unwrap(),
        json!({"cmd": "current_url"})
    );
}

#[test]
fn request_names_match_wire_cmd() {
    let requests = vec![
        BrowserRequest::Navigate { url: "https://example.com".into() },
        BrowserRequest::Click { selector: "#a".into() },
        BrowserRequest::IsVisible { selector: "#a".into() },
        BrowserRequest::Content,
        BrowserRequest::Quit,
    ];
    for request in &requests {
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value["cmd"], request.name());
    }
}

// ============================================================================
// Response decoding
// ============================================================================

#[test]
fn ready_line_decodes() {
    let response: BrowserResponse = serde_json::from_str(r#"{"ok": true, "ready": true}"#).unwrap();
    assert!(response.ok);
    assert_eq!(response.ready, Some(true));
    assert!(response.error.is_none());
}

#[test]
fn error_and_payload_fields_are_optional() {
    let failed: BrowserResponse =
        serde_json::from_str(r#"{"ok": false, "error": "Timeout 5000ms exceeded"}"#).unwrap();
    assert!(!failed.ok);
    assert_eq!(failed.error.as_deref(), Some("Timeout 5000ms exceeded"));

    let visible: BrowserResponse =
        serde_json::from_str(r#"{"ok": true, "visible": false}"#).unwrap();
    assert_eq!(visible.visible, Some(false));
    assert!(visible.content.is_none());
}

// ============================================================================
// Launch handshake
// ============================================================================

/// A server that prints `first_line` and then hangs around.
#[cfg(unix)]
fn lingering_server(first_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", &format!("echo '{}'; exec sleep 30", first_line)]);
    command
}

#[cfg(unix)]
fn spawn_err(command: Command) -> DriverError {
    match BrowserSession::spawn(command, "fake-server") {
        Ok(_) => panic!("handshake should have failed"),
        Err(e) => e,
    }
}

#[cfg(unix)]
#[test]
fn refused_handshake_kills_the_server() {
    let start = Instant::now();
    let err = spawn_err(lingering_server(r#"{"ok": false, "error": "no browser"}"#));

    assert!(matches!(err, DriverError::SessionProtocol { ref error, .. } if error == "no browser"));
    // wait() only returns this fast if the server was killed first
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn garbled_ready_line_kills_the_server() {
    let start = Instant::now();
    let err = spawn_err(lingering_server("Playwright starting..."));

    assert!(matches!(err, DriverError::JsonParse { .. }));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn missing_program_is_spawn_error() {
    let err = match BrowserSession::spawn(Command::new("/nonexistent/browser-server"), "missing") {
        Ok(_) => panic!("spawn should have failed"),
        Err(e) => e,
    };
    assert!(matches!(err, DriverError::SubprocessSpawn { ref script, .. } if script == "missing"));
}
