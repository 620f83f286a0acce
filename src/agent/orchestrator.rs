use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::agent::error::OracleError;
use crate::agent::resolver::{ActionResolver, StepOutcome};
use crate::browser::driver::BrowserDriver;
use crate::scenario::scenario_model::ScenarioStep;
use crate::trace::{logger::TraceLogger, trace::TraceEvent};

pub const DEFAULT_STEP_DELAY_MS: u64 = 1000;

/// Outcome of one step, in run order.
#[derive(Debug)]
pub struct StepReport {
    /// 0-based position in the step list
    pub index: usize,
    pub instruction: String,
    pub object: Option<String>,
    pub outcome: StepOutcome,
}

impl StepReport {
    pub fn is_error(&self) -> bool {
        !self.outcome.is_ok()
    }

    pub fn text(&self) -> String {
        self.outcome.text()
    }
}

/// A run stopped early because the intent oracle failed.
#[derive(Debug, Error)]
#[error("run aborted at step {failed_step}: {source}")]
pub struct RunError {
    /// Reports of the steps that finished before the failure
    pub completed: Vec<StepReport>,
    pub failed_step: usize,
    #[source]
    pub source: OracleError,
}

/// Runs steps one after another through an `ActionResolver`.
///
/// A failing step is recorded and the loop moves on; only an oracle failure
/// ends the run.
pub struct OrchestrationLoop {
    step_delay: Duration,
    tracer: TraceLogger,
    snapshot_dir: Option<PathBuf>,
}

impl Default for OrchestrationLoop {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            tracer: TraceLogger::disabled(),
            snapshot_dir: None,
        }
    }
}

impl OrchestrationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause after each step.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    /// Write the page HTML to `dir` after every step.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn run(
        &self,
        driver: &mut dyn BrowserDriver,
        resolver: &mut ActionResolver,
        page_name: &str,
        steps: &[ScenarioStep],
    ) -> Result<Vec<StepReport>, RunError> {
        let mut reports = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            info!("task {}/{}", index + 1, steps.len());
            let event = TraceEvent::now(index, page_name, &step.instruction)
                .with_object(step.object.as_deref());

            let outcome = match resolver.resolve(
                driver,
                page_name,
                &step.instruction,
                step.object.as_deref(),
            ) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(step = index, error = %e, "intent oracle failed, aborting run");
                    self.tracer.log(&event.with_fatal(&e));
                    return Err(RunError {
                        completed: reports,
                        failed_step: index,
                        source: e,
                    });
                }
            };

            match &outcome.result {
                Ok(text) => info!(step = index, "result: {}", text),
                Err(e) => warn!(step = index, "step failed: {}", e),
            }
            self.tracer.log(&event.with_outcome(&outcome));

            reports.push(StepReport {
                index,
                instruction: step.instruction.clone(),
                object: step.object.clone(),
                outcome,
            });

            if !self.step_delay.is_zero() {
                thread::sleep(self.step_delay);
            }
            if let Some(dir) = &self.snapshot_dir {
                save_snapshot(driver, dir, index + 1);
            }
        }

        Ok(reports)
    }
}

fn save_snapshot(driver: &mut dyn BrowserDriver, dir: &Path, step_number: usize) {
    let content = match driver.content() {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "could not read page for snapshot");
            return;
        }
    };

    let path = dir.join(format!("page_after_step_{}.html", step_number));
    let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &content));
    match written {
        Ok(()) => debug!(path = %path.display(), bytes = content.len(), "page snapshot saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not save page snapshot"),
    }
}
