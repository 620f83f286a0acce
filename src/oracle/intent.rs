use crate::agent::error::{DriverError, OracleError};
use crate::browser::driver::BrowserDriver;

pub const DEFAULT_CONTENT_LIMIT: usize = 2000;

/// What the oracle gets to see of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    /// Page HTML, truncated to the capture limit
    pub content: String,
}

impl PageSnapshot {
    /// Read URL and content from the driver, keeping at most `limit`
    /// characters of content.
    pub fn capture(driver: &mut dyn BrowserDriver, limit: usize) -> Result<Self, DriverError> {
        let url = driver.current_url()?;
        let content = driver.content()?;
        Ok(Self {
            url,
            content: truncate_chars(&content, limit),
        })
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Turns an instruction plus a page snapshot into one action line.
///
/// Replies are untrusted free text; callers validate them with the action
/// grammar.
pub trait IntentOracle {
    fn next_action(&self, snapshot: &PageSnapshot, instruction: &str)
    -> Result<String, OracleError>;
}

pub const SYSTEM_PROMPT: &str = r#"You are a QA automation expert. Analyze the page and provide the NEXT action in this exact format:

ACTION_TYPE | SELECTOR | VALUE | DESCRIPTION

Valid ACTION_TYPEs:
- fill: Fill input field
- click: Click button/element
- wait_for: Wait for element to appear
- clear: Clear input field
- verify: Check if element is visible

Examples:
fill | input#user-name | standard_user | Fill username
click | input#login-button | | Click login button
wait_for | text=Products | | Wait for success page
verify | text=Products | | Check if logged in

Be direct. Only respond with the action format."#;

/// User prompt carrying the page snapshot and the task.
pub fn build_user_prompt(snapshot: &PageSnapshot, instruction: &str) -> String {
    format!(
        "URL: {}\nPAGE HTML (first {} chars): {}...\n\nTASK: {}\n\nWhat is the NEXT action? Respond in ACTION_TYPE | SELECTOR | VALUE | DESCRIPTION format.",
        snapshot.url,
        snapshot.content.chars().count(),
        snapshot.content,
        instruction
    )
}
