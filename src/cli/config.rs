use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::action::executor::{
    DEFAULT_CLICK_SETTLE_MS, DEFAULT_FILL_SETTLE_MS, DEFAULT_WAIT_FOR_TIMEOUT_MS,
};
use crate::agent::orchestrator::DEFAULT_STEP_DELAY_MS;
use crate::oracle::intent::DEFAULT_CONTENT_LIMIT;
use crate::oracle::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_CONFIG_FILE: &str = "locator-cache.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "locator-cache",
    version,
    about = "LLM-driven browser actions with a persistent locator cache"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama chat endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Directory holding repository files
    #[arg(long, global = true)]
    pub repo_dir: Option<String>,

    /// Repository name (file is <repo-dir>/<repo-name>.json)
    #[arg(long, global = true)]
    pub repo_name: Option<String>,

    /// Path to config file (default: locator-cache.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario in the browser, reusing cached locators
    Run {
        /// Scenario YAML file (default: built-in Swag Labs login)
        #[arg(long)]
        scenario: Option<String>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,
    },

    /// Print the object repository
    Show {
        /// Only show this page
        #[arg(long)]
        page: Option<String>,
    },

    /// Find an object by name or description
    Search {
        #[arg(long)]
        page: String,

        #[arg(long)]
        term: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `locator-cache.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_repo_dir")]
    pub dir: String,

    #[serde(default = "default_repo_name")]
    pub name: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            dir: default_repo_dir(),
            name: default_repo_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,

    #[serde(default)]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            headless: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    #[serde(default = "default_fill_settle_ms")]
    pub fill_settle_ms: u64,

    #[serde(default = "default_click_settle_ms")]
    pub click_settle_ms: u64,

    #[serde(default = "default_wait_for_timeout_ms")]
    pub wait_for_timeout_ms: u64,

    #[serde(default = "default_content_limit")]
    pub content_limit: usize,

    #[serde(default = "default_final_check_delay_ms")]
    pub final_check_delay_ms: u64,

    #[serde(default = "default_trace_file")]
    pub trace_file: Option<String>,

    pub snapshot_dir: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            fill_settle_ms: DEFAULT_FILL_SETTLE_MS,
            click_settle_ms: DEFAULT_CLICK_SETTLE_MS,
            wait_for_timeout_ms: DEFAULT_WAIT_FOR_TIMEOUT_MS,
            content_limit: DEFAULT_CONTENT_LIMIT,
            final_check_delay_ms: default_final_check_delay_ms(),
            trace_file: default_trace_file(),
            snapshot_dir: None,
        }
    }
}

// Serde default helpers
fn default_repo_dir() -> String { "repositories".to_string() }
fn default_repo_name() -> String { "object_repository".to_string() }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_server_script() -> String { "node/browser_server.js".to_string() }
fn default_step_delay_ms() -> u64 { DEFAULT_STEP_DELAY_MS }
fn default_fill_settle_ms() -> u64 { DEFAULT_FILL_SETTLE_MS }
fn default_click_settle_ms() -> u64 { DEFAULT_CLICK_SETTLE_MS }
fn default_wait_for_timeout_ms() -> u64 { DEFAULT_WAIT_FOR_TIMEOUT_MS }
fn default_content_limit() -> usize { DEFAULT_CONTENT_LIMIT }
fn default_final_check_delay_ms() -> u64 { 3000 }
fn default_trace_file() -> Option<String> { Some("run_trace.jsonl".to_string()) }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Apply global CLI overrides on top of the file config (CLI wins).
pub fn apply_cli_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(endpoint) = &cli.ollama_endpoint {
        config.ollama.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.ollama_model {
        config.ollama.model = model.clone();
    }
    if let Some(dir) = &cli.repo_dir {
        config.repository.dir = dir.clone();
    }
    if let Some(name) = &cli.repo_name {
        config.repository.name = name.clone();
    }
    config
}
