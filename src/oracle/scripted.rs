use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::agent::error::OracleError;
use crate::oracle::intent::{IntentOracle, PageSnapshot};

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<String>,
    instructions: Vec<String>,
}

/// Replays canned replies in order and records every call.
///
/// Clones share the same script, so a test can hand one clone to the
/// resolver and keep another to count calls. Running out of replies is an
/// `OracleError::Exhausted`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    script: Rc<RefCell<Script>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let oracle = Self::default();
        oracle
            .script
            .borrow_mut()
            .replies
            .extend(replies.into_iter().map(Into::into));
        oracle
    }

    pub fn push_reply(&self, reply: &str) {
        self.script.borrow_mut().replies.push_back(reply.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.script.borrow().instructions.len()
    }

    /// Instructions received so far, in call order.
    pub fn instructions(&self) -> Vec<String> {
        self.script.borrow().instructions.clone()
    }
}

impl IntentOracle for ScriptedOracle {
    fn next_action(
        &self,
        _snapshot: &PageSnapshot,
        instruction: &str,
    ) -> Result<String, OracleError> {
        let mut script = self.script.borrow_mut();
        script.instructions.push(instruction.to_string());
        script
            .replies
            .pop_front()
            .ok_or_else(|| OracleError::Exhausted(instruction.to_string()))
    }
}
