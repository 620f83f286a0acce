use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::agent::resolver::StepOutcome;

/// One line of the JSONL run trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp: NaiveDateTime,
    pub step: usize,

    pub page: String,
    pub instruction: String,
    pub object: Option<String>,

    /// "cache" or "oracle"
    pub source: Option<String>,
    pub action: Option<String>,

    pub result: Option<String>,
    pub failed: bool,
}

impl TraceEvent {
    pub fn now(step: usize, page: &str, instruction: &str) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            step,
            page: page.to_string(),
            instruction: instruction.to_string(),
            object: None,
            source: None,
            action: None,
            result: None,
            failed: false,
        }
    }

    pub fn with_object(mut self, object: Option<&str>) -> Self {
        self.object = object.map(str::to_string);
        self
    }

    pub fn with_outcome(mut self, outcome: &StepOutcome) -> Self {
        self.source = Some(outcome.resolution.as_str().to_string());
        self.action = outcome.action_line.clone();
        self.result = Some(outcome.text());
        self.failed = !outcome.is_ok();
        self
    }

    /// Mark the step as aborted by a fatal error.
    pub fn with_fatal(mut self, error: impl ToString) -> Self {
        self.result = Some(error.to_string());
        self.failed = true;
        self
    }
}
