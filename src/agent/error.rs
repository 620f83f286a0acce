use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the browser server process.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Node.js subprocess failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed on a line read from the server
    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization failed for an outgoing request
    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading from or writing to the server pipes failed
    #[error("Session I/O error: {0}")]
    SessionIO(String),

    /// The server answered with ok=false or an incomplete response
    #[error("{command} failed: {error}")]
    SessionProtocol { command: String, error: String },
}

/// Cache file could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed repository {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An action line with fewer than two fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid action: {line}")]
pub struct ParseError {
    pub line: String,
}

/// A driver operation failed while executing an action.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ExecutionError {
    pub kind: String,
    pub selector: String,
    #[source]
    pub source: DriverError,
}

/// Non-fatal failure of a single step. The display text is the result
/// string reported for the step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Exec error: {0}")]
    Execution(#[from] ExecutionError),

    /// Page state could not be captured for the oracle prompt
    #[error("Error: {0}")]
    Snapshot(#[source] DriverError),
}

/// The intent oracle could not produce a reply. Fatal for the run.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("intent oracle request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("intent oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("intent oracle response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("intent oracle HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),

    #[error("no scripted oracle reply left for: {0}")]
    Exhausted(String),
}
