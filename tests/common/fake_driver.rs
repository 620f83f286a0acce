use std::collections::HashSet;

use locator_cache::agent::error::DriverError;
use locator_cache::browser::driver::BrowserDriver;

/// In-memory stand-in for a browser page.
///
/// Records every call, fails any operation on a selector listed in
/// `broken`, and reports visibility / presence from `visible`.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub url: String,
    pub html: String,
    pub visible: HashSet<String>,
    pub broken: HashSet<String>,
    pub calls: Vec<String>,
    pub fail_snapshot: bool,
}

impl FakeDriver {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            html: html.to_string(),
            ..Self::default()
        }
    }

    pub fn with_visible(mut self, selector: &str) -> Self {
        self.visible.insert(selector.to_string());
        self
    }

    pub fn with_broken(mut self, selector: &str) -> Self {
        self.broken.insert(selector.to_string());
        self
    }

    fn check(&self, command: &str, selector: &str) -> Result<(), DriverError> {
        if self.broken.contains(selector) {
            return Err(DriverError::SessionProtocol {
                command: command.into(),
                error: format!("no element matches selector {}", selector),
            });
        }
        Ok(())
    }
}

impl BrowserDriver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.calls.push(format!("navigate {}", url));
        self.url = url.to_string();
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.calls.push(format!("fill {} {}", selector, value));
        self.check("fill", selector)
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.calls.push(format!("click {}", selector));
        self.check("click", selector)
    }

    fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> Result<(), DriverError> {
        self.calls.push(format!("wait_for {} {}", selector, timeout_ms));
        self.check("wait_for_selector", selector)?;
        if self.visible.contains(selector) {
            Ok(())
        } else {
            Err(DriverError::SessionProtocol {
                command: "wait_for_selector".into(),
                error: format!("Timeout {}ms exceeded", timeout_ms),
            })
        }
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, DriverError> {
        self.calls.push(format!("is_visible {}", selector));
        self.check("is_visible", selector)?;
        Ok(self.visible.contains(selector))
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        if self.fail_snapshot {
            return Err(DriverError::SessionIO("browser server went away".into()));
        }
        Ok(self.url.clone())
    }

    fn content(&mut self) -> Result<String, DriverError> {
        if self.fail_snapshot {
            return Err(DriverError::SessionIO("browser server went away".into()));
        }
        Ok(self.html.clone())
    }
}
