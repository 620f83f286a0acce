use crate::agent::error::DriverError;

/// Browser capability consumed by the executor and the resolver.
///
/// Implementations own a single page; callers hold it exclusively for the
/// duration of a run, so every operation takes `&mut self`. Retry and
/// default timeouts are the implementation's own business.
pub trait BrowserDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;

    fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    /// Wait until `selector` is attached, failing after `timeout_ms`.
    fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> Result<(), DriverError>;

    /// Non-blocking visibility check. A missing element is `Ok(false)`.
    fn is_visible(&mut self, selector: &str) -> Result<bool, DriverError>;

    fn current_url(&mut self) -> Result<String, DriverError>;

    /// Full HTML of the current page.
    fn content(&mut self) -> Result<String, DriverError>;
}
