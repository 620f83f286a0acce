//! Natural-language browser actions with a persistent locator cache.
//!
//! An instruction such as "Fill username field with 'standard_user'" is
//! resolved to a `kind | selector | value | description` action line, either
//! replayed from the object repository or obtained from an intent oracle,
//! and executed against a browser driver.

pub mod action;
pub mod agent;
pub mod browser;
pub mod cli;
pub mod oracle;
pub mod report;
pub mod repository;
pub mod scenario;
pub mod trace;
