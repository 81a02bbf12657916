//! Deterministic in-memory service for tests and offline runs.
//!
//! Replies are chosen by the first rule whose needle occurs in the prompt.

use async_trait::async_trait;
use insight_core::{Error, Result};
use parking_lot::Mutex;

use crate::service::GenerativeTextService;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail,
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    reply: Reply,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCall {
    pub prompt: String,
    pub expect_structured: bool,
}

#[derive(Default)]
pub struct ScriptedService {
    rules: Vec<Rule>,
    fallback: Option<String>,
    calls: Mutex<Vec<ScriptedCall>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` when the prompt contains `needle`.
    pub fn on(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            reply: Reply::Text(text.into()),
        });
        self
    }

    /// Fail with `ServiceUnavailable` when the prompt contains `needle`.
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            reply: Reply::Fail,
        });
        self
    }

    /// Reply used when no rule matches. Without one, unmatched calls fail.
    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of recorded prompts containing `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .count()
    }
}

#[async_trait]
impl GenerativeTextService for ScriptedService {
    async fn generate(&self, prompt: &str, expect_structured: bool) -> Result<String> {
        self.calls.lock().push(ScriptedCall {
            prompt: prompt.to_string(),
            expect_structured,
        });

        let reply = self
            .rules
            .iter()
            .find(|r| prompt.contains(&r.needle))
            .map(|r| r.reply.clone())
            .or_else(|| self.fallback.clone().map(Reply::Text));

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail) => Err(Error::ServiceUnavailable("scripted failure".to_string())),
            None => Err(Error::ServiceUnavailable(
                "no scripted reply for prompt".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
