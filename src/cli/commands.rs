use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::action::executor::ActionExecutor;
use crate::agent::orchestrator::{OrchestrationLoop, StepReport};
use crate::agent::resolver::ActionResolver;
use crate::browser::driver::BrowserDriver;
use crate::browser::session::BrowserSession;
use crate::cli::config::AppConfig;
use crate::oracle::ollama::OllamaOracle;
use crate::report::console::{format_repository, format_run_report};
use crate::repository::backend::JsonFileBackend;
use crate::repository::store::LocatorStore;
use crate::scenario::scenario_model::{Scenario, load_scenario};
use crate::trace::logger::TraceLogger;

/// Open the repository named in the config.
pub fn open_store(config: &AppConfig) -> LocatorStore {
    let backend = JsonFileBackend::new(&config.repository.dir, &config.repository.name);
    info!(path = %backend.path().display(), "object repository");
    LocatorStore::load(Box::new(backend))
}

/// Build the executor from the run timings in the config.
pub fn build_executor(config: &AppConfig) -> ActionExecutor {
    ActionExecutor::new()
        .with_settle(
            Duration::from_millis(config.run.fill_settle_ms),
            Duration::from_millis(config.run.click_settle_ms),
        )
        .with_wait_for_timeout(config.run.wait_for_timeout_ms)
}

/// Build the orchestration loop (delay, trace file, snapshots) from config.
pub fn build_loop(config: &AppConfig) -> OrchestrationLoop {
    let mut run_loop =
        OrchestrationLoop::new().with_step_delay(Duration::from_millis(config.run.step_delay_ms));
    if let Some(path) = &config.run.trace_file {
        run_loop = run_loop.with_tracer(TraceLogger::new(path));
    }
    if let Some(dir) = &config.run.snapshot_dir {
        run_loop = run_loop.with_snapshot_dir(dir);
    }
    run_loop
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run a scenario and return whether the final verification passed.
pub fn cmd_run(
    config: &AppConfig,
    scenario_path: Option<&str>,
    headless: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let scenario = match scenario_path {
        Some(path) => load_scenario(path)?,
        None => Scenario::demo_login(),
    };

    let store = open_store(config);
    print!("{}", format_repository(&store, None));

    let oracle = OllamaOracle::new(
        &config.ollama.endpoint,
        &config.ollama.model,
        config.ollama.timeout_secs,
    )?;
    let mut resolver = ActionResolver::new(store, Box::new(oracle), build_executor(config))
        .with_content_limit(config.run.content_limit);

    info!(scenario = %scenario.name, "starting browser");
    let mut session = BrowserSession::launch(
        &config.browser.server_script,
        headless || config.browser.headless,
    )?;

    let outcome = run_in_session(config, &scenario, &mut session, &mut resolver);

    info!("closing browser");
    if let Err(e) = session.quit() {
        warn!(error = %e, "browser cleanup failed");
    }

    print!("{}", format_repository(resolver.store(), None));
    outcome
}

fn run_in_session(
    config: &AppConfig,
    scenario: &Scenario,
    driver: &mut dyn BrowserDriver,
    resolver: &mut ActionResolver,
) -> Result<bool, Box<dyn std::error::Error>> {
    info!(url = %scenario.start_url, "loading start page");
    driver.navigate(&scenario.start_url)?;

    let reports = match build_loop(config).run(driver, resolver, &scenario.page, &scenario.steps) {
        Ok(reports) => reports,
        Err(e) => {
            print!("{}", format_run_report(&e.completed));
            error!(error = %e, "run aborted");
            return Err(e.into());
        }
    };
    print!("{}", format_run_report(&reports));

    Ok(final_check(config, scenario, driver, &reports))
}

/// Independent check after all steps ran; passes when no selector is set.
fn final_check(
    config: &AppConfig,
    scenario: &Scenario,
    driver: &mut dyn BrowserDriver,
    reports: &[StepReport],
) -> bool {
    let Some(selector) = &scenario.verify else {
        return reports.iter().all(|r| !r.is_error());
    };

    thread::sleep(Duration::from_millis(config.run.final_check_delay_ms));
    match driver.is_visible(selector) {
        Ok(true) => {
            info!(selector = %selector, "scenario passed: verification element visible");
            true
        }
        Ok(false) => {
            error!(selector = %selector, "scenario failed: verification element not visible");
            false
        }
        Err(e) => {
            error!(selector = %selector, error = %e, "verification error");
            false
        }
    }
}

// ============================================================================
// show / search subcommands
// ============================================================================

pub fn cmd_show(config: &AppConfig, page: Option<&str>) {
    let store = open_store(config);
    print!("{}", format_repository(&store, page));
}

/// Print the first object matching `term`; returns whether one was found.
pub fn cmd_search(config: &AppConfig, page: &str, term: &str) -> bool {
    let store = open_store(config);
    match store.search(page, term) {
        Some(record) => {
            println!("{} / {}", record.page, record.object);
            println!("  Locator: {}", record.selector);
            println!("  Type: {}", record.kind);
            println!("  Description: {}", record.description);
            println!("  Used: {} times", record.used_count);
            true
        }
        None => {
            println!("No object matching '{}' on page {}", term, page);
            false
        }
    }
}
