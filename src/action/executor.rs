use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::action::grammar::{ActionKind, ParsedAction, parse_action};
use crate::agent::error::{DriverError, ExecutionError, StepError};
use crate::browser::driver::BrowserDriver;

pub const DEFAULT_FILL_SETTLE_MS: u64 = 500;
pub const DEFAULT_CLICK_SETTLE_MS: u64 = 1000;
pub const DEFAULT_WAIT_FOR_TIMEOUT_MS: u64 = 5000;

type Handler =
    fn(&ActionExecutor, &mut dyn BrowserDriver, &ParsedAction) -> Result<String, DriverError>;

/// Applies parsed actions to a browser driver.
///
/// Driver failures are contained here: they come back as
/// `StepError::Execution` and never abort the caller.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    fill_settle: Duration,
    click_settle: Duration,
    wait_for_timeout_ms: u64,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self {
            fill_settle: Duration::from_millis(DEFAULT_FILL_SETTLE_MS),
            click_settle: Duration::from_millis(DEFAULT_CLICK_SETTLE_MS),
            wait_for_timeout_ms: DEFAULT_WAIT_FOR_TIMEOUT_MS,
        }
    }
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor without settle delays (tests, dry runs).
    pub fn immediate() -> Self {
        Self {
            fill_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_settle(mut self, fill: Duration, click: Duration) -> Self {
        self.fill_settle = fill;
        self.click_settle = click;
        self
    }

    pub fn with_wait_for_timeout(mut self, timeout_ms: u64) -> Self {
        self.wait_for_timeout_ms = timeout_ms;
        self
    }

    pub fn wait_for_timeout_ms(&self) -> u64 {
        self.wait_for_timeout_ms
    }

    fn handler_for(kind: &ActionKind) -> Option<Handler> {
        match kind {
            ActionKind::Fill => Some(Self::fill),
            ActionKind::Click => Some(Self::click),
            ActionKind::WaitFor => Some(Self::wait_for),
            ActionKind::Clear => Some(Self::clear),
            ActionKind::Verify => Some(Self::verify),
            ActionKind::Other(_) => None,
        }
    }

    /// Execute one parsed action and describe the outcome.
    pub fn execute(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, StepError> {
        debug!(kind = %action.kind, selector = %action.selector, "executing action");

        let handler = Self::handler_for(&action.kind)
            .ok_or_else(|| StepError::UnknownAction(action.kind.to_string()))?;

        handler(self, driver, action).map_err(|e| {
            StepError::Execution(ExecutionError {
                kind: action.kind.to_string(),
                selector: action.selector.clone(),
                source: e,
            })
        })
    }

    /// Parse an action line and execute it.
    pub fn execute_line(
        &self,
        driver: &mut dyn BrowserDriver,
        line: &str,
    ) -> Result<String, StepError> {
        let action = parse_action(line)?;
        self.execute(driver, &action)
    }

    fn settle(delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    fn fill(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, DriverError> {
        driver.fill(&action.selector, &action.value)?;
        Self::settle(self.fill_settle);
        Ok(format!("Filled {} = '{}'", action.selector, action.value))
    }

    fn click(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, DriverError> {
        driver.click(&action.selector)?;
        Self::settle(self.click_settle);
        Ok(format!("Clicked {}", action.selector))
    }

    fn wait_for(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, DriverError> {
        driver.wait_for_selector(&action.selector, self.wait_for_timeout_ms)?;
        Ok(format!("Element appeared: {}", action.selector))
    }

    fn clear(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, DriverError> {
        driver.fill(&action.selector, "")?;
        Self::settle(self.fill_settle);
        Ok(format!("Cleared {}", action.selector))
    }

    fn verify(
        &self,
        driver: &mut dyn BrowserDriver,
        action: &ParsedAction,
    ) -> Result<String, DriverError> {
        let visible = driver.is_visible(&action.selector)?;
        Ok(format!(
            "{}: {}",
            action.selector,
            if visible { "visible" } else { "NOT visible" }
        ))
    }
}
