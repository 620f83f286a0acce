use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agent::error::ParseError;

/// Kind of browser action carried on an action line.
///
/// Unrecognized kinds are kept verbatim in `Other` so they survive a round
/// trip through the repository file; they fail only when executed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Fill,
    Click,
    WaitFor,
    Clear,
    /// Visibility check, also spelled `check_visible`
    Verify,
    Other(String),
}

impl ActionKind {
    /// Parse a kind name. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "fill" => ActionKind::Fill,
            "click" => ActionKind::Click,
            "wait_for" => ActionKind::WaitFor,
            "clear" => ActionKind::Clear,
            "verify" | "check_visible" => ActionKind::Verify,
            _ => ActionKind::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Fill => "fill",
            ActionKind::Click => "click",
            ActionKind::WaitFor => "wait_for",
            ActionKind::Clear => "clear",
            ActionKind::Verify => "verify",
            ActionKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActionKind {
    fn from(name: String) -> Self {
        ActionKind::parse(&name)
    }
}

impl From<&str> for ActionKind {
    fn from(name: &str) -> Self {
        ActionKind::parse(name)
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One parsed `ACTION_KIND | SELECTOR | VALUE | DESCRIPTION` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub kind: ActionKind,
    pub selector: String,
    pub value: String,
    pub description: String,
}

impl ParsedAction {
    pub fn new(kind: ActionKind, selector: &str, value: &str, description: &str) -> Self {
        Self {
            kind,
            selector: selector.to_string(),
            value: value.to_string(),
            description: description.to_string(),
        }
    }

    /// Serialize back to the wire format (all four fields).
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.kind, self.selector, self.value, self.description
        )
    }
}

impl fmt::Display for ParsedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl FromStr for ParsedAction {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse_action(line)
    }
}

/// Parse an action line.
///
/// Fields are split on `|` and trimmed; the kind is lower-cased. At least
/// the kind and selector must be present. Missing value and description
/// become empty strings, and anything past the fourth field is ignored.
pub fn parse_action(line: &str) -> Result<ParsedAction, ParseError> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(ParseError {
            line: line.to_string(),
        });
    }

    let field = |i: usize| parts.get(i).copied().unwrap_or("").to_string();

    Ok(ParsedAction {
        kind: ActionKind::parse(parts[0]),
        selector: field(1),
        value: field(2),
        description: field(3),
    })
}
