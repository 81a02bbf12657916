//! Friendly titles for documents whose names look machine-generated.

use std::sync::Arc;

use insight_ingest::title::{looks_machine_generated, title_case};
use insight_llm::GenerativeTextService;
use tracing::{debug, warn};

use crate::prompts;

/// Generated titles longer than this are discarded.
const MAX_TITLE_CHARS: usize = 100;

pub struct TitleGenerator {
    service: Arc<dyn GenerativeTextService>,
}

impl TitleGenerator {
    pub fn new(service: Arc<dyn GenerativeTextService>) -> Self {
        Self { service }
    }

    /// Readable titles are title-cased; unclear ones are sent to the service.
    /// Any failure keeps the cleaned title as given.
    pub async fn friendly_title(&self, cleaned: &str) -> String {
        let cleaned = cleaned.trim();
        if !looks_machine_generated(cleaned) {
            return title_case(cleaned);
        }

        match self.service.generate(&prompts::friendly_title(cleaned), false).await {
            Ok(reply) => {
                let title = reply
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or_default()
                    .trim_matches(|c| c == '"' || c == '\'' || c == '*')
                    .trim();
                if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
                    warn!("Discarding generated title for '{}'", cleaned);
                    cleaned.to_string()
                } else {
                    debug!("Renamed '{}' to '{}'", cleaned, title);
                    title.to_string()
                }
            }
            Err(e) => {
                warn!("Title generation failed for '{}': {}", cleaned, e);
                cleaned.to_string()
            }
        }
    }
}
