use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::action::grammar::ActionKind;

/// Objects of one page, keyed by object name.
pub type PageObjects = BTreeMap<String, LocatorEntry>;

/// Whole repository, keyed by page name. This is the shape of the JSON file.
pub type Repository = BTreeMap<String, PageObjects>;

/// A stored locator as it appears in the repository file.
///
/// Timestamps are naive local ISO-8601 so files written by earlier tooling
/// (`2025-01-15T10:30:00.123456`) load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorEntry {
    pub locator: String,

    #[serde(rename = "type")]
    pub kind: ActionKind,

    #[serde(default)]
    pub description: String,

    pub discovered_at: NaiveDateTime,

    #[serde(default)]
    pub used_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<NaiveDateTime>,
}

/// A discovered UI element together with its `(page, object)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatorRecord {
    pub page: String,
    pub object: String,
    pub selector: String,
    pub kind: ActionKind,
    pub description: String,
    pub discovered_at: NaiveDateTime,
    pub last_used_at: Option<NaiveDateTime>,
    pub used_count: u64,
}

impl LocatorRecord {
    pub fn from_entry(page: &str, object: &str, entry: &LocatorEntry) -> Self {
        Self {
            page: page.to_string(),
            object: object.to_string(),
            selector: entry.locator.clone(),
            kind: entry.kind.clone(),
            description: entry.description.clone(),
            discovered_at: entry.discovered_at,
            last_used_at: entry.last_used_at,
            used_count: entry.used_count,
        }
    }
}
