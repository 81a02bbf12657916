//! The generative text service seam.

use std::sync::Arc;

use async_trait::async_trait;
use insight_core::{Error, Result};
use tracing::{info, warn};

use crate::config::LLMConfig;
use crate::providers::HttpGenerator;

/// Text in, text out. Implementations may fail or return malformed text;
/// callers own recovery.
#[async_trait]
pub trait GenerativeTextService: Send + Sync {
    /// Generate a completion for `prompt`. With `expect_structured` the
    /// service is asked for a JSON object, but callers must still validate.
    async fn generate(&self, prompt: &str, expect_structured: bool) -> Result<String>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Placeholder service that always fails (no provider configured).
pub struct NoopGenerator;

#[async_trait]
impl GenerativeTextService for NoopGenerator {
    async fn generate(&self, _prompt: &str, _expect_structured: bool) -> Result<String> {
        Err(Error::ServiceUnavailable(
            "no LLM provider configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Build the service selected by `config`, or a [`NoopGenerator`] when no
/// provider has a key.
pub fn create_generator(config: &LLMConfig) -> Arc<dyn GenerativeTextService> {
    let Some(resolved) = config.resolve_provider() else {
        warn!("No LLM API key configured; synthesis calls will fail and fall back");
        return Arc::new(NoopGenerator);
    };

    match HttpGenerator::new(resolved.clone(), config.options) {
        Ok(generator) => {
            info!(
                "Using {} with model {}",
                resolved.provider, resolved.model
            );
            Arc::new(generator)
        }
        Err(e) => {
            warn!("Failed to build HTTP client for {}: {}", resolved.provider, e);
            Arc::new(NoopGenerator)
        }
    }
}
