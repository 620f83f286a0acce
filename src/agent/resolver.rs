use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::action::executor::ActionExecutor;
use crate::action::grammar::{ActionKind, ParsedAction, parse_action};
use crate::agent::error::{OracleError, StepError};
use crate::browser::driver::BrowserDriver;
use crate::oracle::intent::{DEFAULT_CONTENT_LIMIT, IntentOracle, PageSnapshot};
use crate::repository::locator_model::LocatorRecord;
use crate::repository::store::LocatorStore;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("quoted-value pattern is valid"));

/// How a step's action was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Rebuilt from the object repository, no oracle call
    Cache,
    /// Asked the intent oracle
    Oracle,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Cache => "cache",
            Resolution::Oracle => "oracle",
        }
    }
}

/// Result of resolving and executing one instruction.
#[derive(Debug)]
pub struct StepOutcome {
    pub resolution: Resolution,
    /// The action line that was executed (or failed to parse)
    pub action_line: Option<String>,
    pub result: Result<String, StepError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Human-readable result string, success or failure.
    pub fn text(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        }
    }
}

/// First `'…'` quoted substring of an instruction, or empty.
pub fn quoted_value(instruction: &str) -> String {
    QUOTED
        .captures(instruction)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Rebuild the action for a cached locator. Only `fill` takes a value,
/// pulled from the instruction's first quoted substring.
pub fn cached_action(record: &LocatorRecord, instruction: &str) -> ParsedAction {
    let value = if record.kind == ActionKind::Fill {
        quoted_value(instruction)
    } else {
        String::new()
    };
    ParsedAction::new(
        record.kind.clone(),
        &record.selector,
        &value,
        &record.description,
    )
}

/// Cache-first instruction resolver.
///
/// Known `(page, object)` pairs are replayed from the repository; anything
/// else goes to the intent oracle, and what it discovers is stored for the
/// next run.
pub struct ActionResolver {
    store: LocatorStore,
    oracle: Box<dyn IntentOracle>,
    executor: ActionExecutor,
    content_limit: usize,
}

impl ActionResolver {
    pub fn new(store: LocatorStore, oracle: Box<dyn IntentOracle>, executor: ActionExecutor) -> Self {
        Self {
            store,
            oracle,
            executor,
            content_limit: DEFAULT_CONTENT_LIMIT,
        }
    }

    /// Maximum number of page-content characters sent to the oracle.
    pub fn with_content_limit(mut self, limit: usize) -> Self {
        self.content_limit = limit;
        self
    }

    pub fn store(&self) -> &LocatorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LocatorStore {
        &mut self.store
    }

    pub fn into_store(self) -> LocatorStore {
        self.store
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// Resolve `instruction` to an action and execute it.
    ///
    /// Step failures (bad oracle reply, driver errors) are reported inside
    /// the returned outcome. Only an oracle failure is returned as `Err`.
    pub fn resolve(
        &mut self,
        driver: &mut dyn BrowserDriver,
        page_name: &str,
        instruction: &str,
        object_name: Option<&str>,
    ) -> Result<StepOutcome, OracleError> {
        info!(page = page_name, object = object_name, "task: {}", instruction);

        if let Some(object) = object_name {
            if let Some(record) = self.store.get(page_name, object) {
                debug!(
                    object,
                    locator = %record.selector,
                    used_count = record.used_count,
                    "found in repository"
                );
                return Ok(self.replay_cached(driver, &record, instruction));
            }
        }

        let snapshot = match PageSnapshot::capture(driver, self.content_limit) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return Ok(StepOutcome {
                    resolution: Resolution::Oracle,
                    action_line: None,
                    result: Err(StepError::Snapshot(e)),
                });
            }
        };

        debug!(url = %snapshot.url, "not in repository, asking intent oracle");
        let reply = self.oracle.next_action(&snapshot, instruction)?;
        info!("oracle returned: {}", reply);

        let action = match parse_action(&reply) {
            Ok(action) => action,
            Err(e) => {
                return Ok(StepOutcome {
                    resolution: Resolution::Oracle,
                    action_line: Some(reply),
                    result: Err(e.into()),
                });
            }
        };

        if let Some(object) = object_name {
            let description = if action.description.is_empty() {
                instruction
            } else {
                action.description.as_str()
            };
            let is_new = self.store.put(
                page_name,
                object,
                &action.selector,
                action.kind.clone(),
                description,
            );
            if is_new {
                info!(page = page_name, object, locator = %action.selector, "stored new locator");
            } else {
                debug!(page = page_name, object, locator = %action.selector, "updated locator");
            }
        }

        let result = self.executor.execute(driver, &action);
        Ok(StepOutcome {
            resolution: Resolution::Oracle,
            action_line: Some(reply),
            result,
        })
    }

    fn replay_cached(
        &self,
        driver: &mut dyn BrowserDriver,
        record: &LocatorRecord,
        instruction: &str,
    ) -> StepOutcome {
        // Execute the rebuilt action directly: the line form is lossy when the
        // value itself contains `|`
        let action = cached_action(record, instruction);
        let line = action.to_line();
        debug!("using cached action: {}", line);

        let result = self.executor.execute(driver, &action);
        StepOutcome {
            resolution: Resolution::Cache,
            action_line: Some(line),
            result,
        }
    }
}
