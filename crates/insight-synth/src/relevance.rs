//! Per-audience relevance statements.
//!
//! One generation call per audience. Replies are parsed leniently, then
//! validated against the length band; anything that fails is replaced by a
//! pre-vetted fallback, so every audience always gets a statement.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use insight_core::{
    AudienceRegistry, Category, Digest, Error, RelevanceConfig, RelevanceStatement, Result,
    StatementOrigin,
};
use insight_ingest::prefix;
use insight_llm::GenerativeTextService;
use tracing::{debug, warn};

use crate::fallback::{fallback_statement, generic_statement};
use crate::json::string_field;
use crate::prompts::{self, RelevancePrompt};

/// Document facts shown to every audience prompt.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceContext<'a> {
    pub title: &'a str,
    pub category: Category,
    pub digest: &'a Digest,
    pub raw_text: &'a str,
}

pub struct RelevanceGenerator {
    service: Arc<dyn GenerativeTextService>,
    config: RelevanceConfig,
}

impl RelevanceGenerator {
    pub fn new(service: Arc<dyn GenerativeTextService>, config: RelevanceConfig) -> Self {
        Self { service, config }
    }

    /// One statement per registered audience, keyed by audience id. Never fails.
    pub async fn generate_relevance(
        &self,
        ctx: &RelevanceContext<'_>,
        audiences: &AudienceRegistry,
    ) -> BTreeMap<String, RelevanceStatement> {
        let summary = ctx.digest.plain_summary.as_str();
        let key_points = ctx.digest.structured_key_points.render_text();
        let excerpt = excerpt(ctx.raw_text, self.config.excerpt_len);

        let calls: Vec<_> = audiences
            .profiles()
            .iter()
            .map(|audience| {
                let prompt = prompts::relevance(&RelevancePrompt {
                    title: ctx.title,
                    category: ctx.category,
                    summary,
                    key_points: &key_points,
                    excerpt: &excerpt,
                    audience,
                });
                statement_for(
                    self.service.clone(),
                    self.config.clone(),
                    audience.id.clone(),
                    ctx.category,
                    prompt,
                )
            })
            .collect();

        let statements: Vec<RelevanceStatement> = stream::iter(calls)
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        statements
            .into_iter()
            .map(|s| (s.audience_id.clone(), s))
            .collect()
    }
}

async fn statement_for(
    service: Arc<dyn GenerativeTextService>,
    config: RelevanceConfig,
    audience_id: String,
    category: Category,
    prompt: String,
) -> RelevanceStatement {
    let reason = service
        .generate(&prompt, true)
        .await
        .and_then(|reply| {
            extract_reason(&reply)
                .ok_or_else(|| Error::MalformedOutput("no relevance_reason in reply".into()))
        })
        .and_then(|text| validate(&config, text));

    match reason {
        Ok(text) => {
            debug!("Generated relevance for {} ({} chars)", audience_id, text.chars().count());
            RelevanceStatement {
                audience_id,
                text,
                origin: StatementOrigin::Generated,
            }
        }
        Err(e) => {
            warn!("Relevance for {} falls back: {}", audience_id, e);
            let statement = fallback_statement(&audience_id, category);
            if statement.origin == StatementOrigin::CategoryFallback {
                if let Err(e) = validate(&config, statement.text.clone()) {
                    warn!("Category fallback for {} rejected: {}", audience_id, e);
                    return generic_statement(&audience_id);
                }
            }
            statement
        }
    }
}

/// Enforce the configured length band (inclusive, in chars).
fn validate(config: &RelevanceConfig, text: String) -> Result<String> {
    let len = text.chars().count();
    if len < config.min_chars || len > config.max_chars {
        return Err(Error::ValidationRejected(format!(
            "{} chars outside {}..={}",
            len, config.min_chars, config.max_chars
        )));
    }
    Ok(text)
}

/// Pull `relevance_reason` out of a reply: strict JSON, embedded JSON, then regex.
pub fn extract_reason(reply: &str) -> Option<String> {
    string_field(reply, "relevance_reason")
        .map(|r| r.trim().trim_matches('"').trim().to_string())
        .filter(|r| !r.is_empty())
}

fn excerpt(text: &str, max_bytes: usize) -> String {
    let head = prefix(text, max_bytes);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}
