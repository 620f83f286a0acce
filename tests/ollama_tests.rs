use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use locator_cache::{
    action::executor::ActionExecutor,
    agent::{error::{OracleError, StepError}, resolver::ActionResolver},
    oracle::{
        intent::{IntentOracle, PageSnapshot, SYSTEM_PROMPT},
        ollama::OllamaOracle,
    },
    repository::store::LocatorStore,
};
use serde_json::Value;

use crate::common::fake_driver::FakeDriver;

mod common;

/// Serve one HTTP request on a local port, answer with `status` and `body`,
/// and hand back the decoded request body.
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/api/chat", listener.local_addr().unwrap());
    let status = status.to_string();
    let body = body.to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request = vec![0u8; content_length];
        reader.read_exact(&mut request).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();

        serde_json::from_slice(&request).unwrap()
    });

    (endpoint, handle)
}

fn snapshot() -> PageSnapshot {
    PageSnapshot {
        url: "https://www.saucedemo.com/".into(),
        content: "<input id=\"user-name\">".into(),
    }
}

// ============================================================================
// Request shape and reply decoding
// ============================================================================

#[test]
fn chat_request_is_non_streaming_and_deterministic() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"message":{"role":"assistant","content":"  fill | input#user-name | standard_user | Fill username\n"}}"#,
    );
    let oracle = OllamaOracle::new(&endpoint, "qwen2.5-coder:7b", 5).unwrap();

    let reply = oracle
        .next_action(&snapshot(), "Fill username field with 'standard_user'")
        .unwrap();
    assert_eq!(reply, "fill | input#user-name | standard_user | Fill username");

    let request = server.join().unwrap();
    assert_eq!(request["model"], "qwen2.5-coder:7b");
    assert_eq!(request["stream"], false);
    assert_eq!(request["options"]["temperature"], 0.0);

    let messages = request["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
    assert_eq!(messages[1]["role"], "user");
    let user = messages[1]["content"].as_str().unwrap();
    assert!(user.contains("URL: https://www.saucedemo.com/"));
    assert!(user.contains("TASK: Fill username field with 'standard_user'"));
}

#[test]
fn http_error_status_is_oracle_failure() {
    let (endpoint, server) = serve_once("500 Internal Server Error", r#"{"error":"model not found"}"#);
    let oracle = OllamaOracle::new(&endpoint, "missing-model", 5).unwrap();

    let err = oracle.next_action(&snapshot(), "Click login").unwrap_err();
    assert!(matches!(err, OracleError::Status { status: 500, ref body } if body.contains("model not found")));
    server.join().unwrap();
}

#[test]
fn blank_reply_fails_only_the_step() {
    let (endpoint, server) = serve_once("200 OK", r#"{"message":{"content":"  \n "}}"#);
    let oracle = OllamaOracle::new(&endpoint, "qwen2.5-coder:7b", 5).unwrap();
    let mut resolver = ActionResolver::new(
        LocatorStore::in_memory(),
        Box::new(oracle),
        ActionExecutor::immediate(),
    );
    let mut driver = FakeDriver::new("https://www.saucedemo.com/", "<html></html>");

    let outcome = resolver
        .resolve(&mut driver, "LoginPage", "Click login", Some("LoginButton"))
        .unwrap();

    assert!(matches!(outcome.result, Err(StepError::Parse(_))));
    assert_eq!(outcome.text(), "Invalid action: ");
    assert!(resolver.store().is_empty());
    server.join().unwrap();
}
