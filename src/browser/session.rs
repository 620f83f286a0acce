use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent::error::DriverError;
use crate::browser::driver::BrowserDriver;

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Navigate { url: String },
    Fill { selector: String, value: String },
    Click { selector: String },
    WaitForSelector { selector: String, timeout_ms: u64 },
    IsVisible { selector: String },
    CurrentUrl,
    Content,
    Quit,
}

impl BrowserRequest {
    /// Command name as it appears on the wire, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::Fill { .. } => "fill",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::WaitForSelector { .. } => "wait_for_selector",
            BrowserRequest::IsVisible { .. } => "is_visible",
            BrowserRequest::CurrentUrl => "current_url",
            BrowserRequest::Content => "content",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A persistent browser session backed by browser_server.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn `node <script>` and wait for its ready signal.
    pub fn launch(script: &str, headless: bool) -> Result<Self, DriverError> {
        let mut command = Command::new("node");
        command.arg(script);
        if headless {
            command.arg("--headless");
        }

        let session = Self::spawn(command, script)?;
        debug!(script, headless, "browser session ready");
        Ok(session)
    }

    /// Spawn any server command that speaks the browser NDJSON protocol.
    /// `script` names it in errors. A server that fails the ready handshake
    /// is killed and reaped before the error is returned.
    pub fn spawn(mut command: Command, script: &str) -> Result<Self, DriverError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DriverError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let pipes = Self::handshake(&mut child, script);
        let (stdin, reader) = match pipes {
            Ok(pipes) => pipes,
            Err(e) => {
                // The server never became ready; don't leave it running
                if let Err(kill_err) = child.kill() {
                    debug!(error = %kill_err, "browser server already exited");
                }
                if let Err(wait_err) = child.wait() {
                    warn!(error = %wait_err, "could not reap browser server");
                }
                return Err(e);
            }
        };

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            closed: false,
        })
    }

    /// Take the child's pipes and wait for `{"ok": true, "ready": true}`.
    fn handshake(
        child: &mut Child,
        script: &str,
    ) -> Result<(ChildStdin, BufReader<ChildStdout>), DriverError> {
        let stdin = child.stdin.take().ok_or_else(|| {
            DriverError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DriverError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| DriverError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
                context: format!("{} ready signal", script),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(DriverError::SessionProtocol {
                command: "launch".into(),
                error: response
                    .error
                    .unwrap_or_else(|| format!("Did not receive ready signal from {}", script)),
            });
        }

        Ok((stdin, reader))
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let json = serde_json::to_string(request).map_err(|e| DriverError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            DriverError::SessionIO(format!("Failed to write to browser server stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            DriverError::SessionIO(format!("Failed to flush browser server stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            DriverError::SessionIO(format!("Failed to read from browser server stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(DriverError::SessionIO(
                "Empty response from browser server (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
            context: format!("{} response", request.name()),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(DriverError::SessionProtocol {
                command: request.name().into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        if let Err(e) = self.send(&BrowserRequest::Quit) {
            debug!(error = %e, "quit request not acknowledged");
        }
        if let Err(e) = self.child.wait() {
            warn!(error = %e, "browser server did not exit cleanly");
        }
        Ok(())
    }
}

impl BrowserDriver for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Navigate {
            url: url.to_string(),
        })?;
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        })?;
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Click {
            selector: selector.to_string(),
        })?;
        Ok(())
    }

    fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::WaitForSelector {
            selector: selector.to_string(),
            timeout_ms,
        })?;
        Ok(())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, DriverError> {
        let response = self.send_ok(&BrowserRequest::IsVisible {
            selector: selector.to_string(),
        })?;
        Ok(response.visible.unwrap_or(false))
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        let response = self.send_ok(&BrowserRequest::CurrentUrl)?;
        response.url.ok_or_else(|| DriverError::SessionProtocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn content(&mut self) -> Result<String, DriverError> {
        let response = self.send_ok(&BrowserRequest::Content)?;
        response.content.ok_or_else(|| DriverError::SessionProtocol {
            command: "content".into(),
            error: "No content in content response".into(),
        })
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}
