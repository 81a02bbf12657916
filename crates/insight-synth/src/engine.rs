//! Adaptive synthesis engine.
//!
//! Short documents are summarized in one call over a bounded prefix. Long
//! documents go through Map (one extraction per segment, bounded
//! concurrency, results kept in segment order) and Reduce (one synthesis over
//! the combined extractions).

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use insight_core::{ContentType, Digest, Error, Result, SynthesisConfig};
use insight_ingest::{prefix, Segmenter};
use insight_llm::GenerativeTextService;
use tracing::{debug, info, warn};

use crate::parser::{self, ParsedDigest};
use crate::prompts;

/// What is known about the source beyond its text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceContext<'a> {
    pub content_type: Option<ContentType>,
    pub title: Option<&'a str>,
}

pub struct SynthesisEngine {
    service: Arc<dyn GenerativeTextService>,
    config: SynthesisConfig,
    segmenter: Segmenter,
}

impl SynthesisEngine {
    /// Fails only when the segment window/overlap pair is invalid.
    pub fn new(service: Arc<dyn GenerativeTextService>, config: SynthesisConfig) -> Result<Self> {
        let segmenter = Segmenter::new(config.segment_window, config.segment_overlap)?;
        Ok(Self {
            service,
            config,
            segmenter,
        })
    }

    pub async fn synthesize(&self, raw_text: &str) -> Result<Digest> {
        self.synthesize_source(raw_text, &SourceContext::default()).await
    }

    /// Produce a whole [`Digest`] or `TotalSynthesisFailure`.
    pub async fn synthesize_source(&self, raw_text: &str, ctx: &SourceContext<'_>) -> Result<Digest> {
        if raw_text.len() <= self.config.chunk_threshold {
            self.direct(raw_text, ctx).await
        } else {
            self.chunked(raw_text, ctx).await
        }
    }

    async fn direct(&self, raw_text: &str, ctx: &SourceContext<'_>) -> Result<Digest> {
        let text = prefix(raw_text, self.config.direct_prefix);
        debug!(
            "Direct synthesis over {} of {} bytes",
            text.len(),
            raw_text.len()
        );

        let reply = match self.service.generate(&prompts::direct(text, ctx), false).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!("Direct synthesis returned an empty reply");
                return Err(Error::TotalSynthesisFailure { attempted: 1 });
            }
            Err(e) => {
                warn!("Direct synthesis failed: {}", e);
                return Err(Error::TotalSynthesisFailure { attempted: 1 });
            }
        };

        Ok(into_digest(parser::parse(&reply), false, 1))
    }

    async fn chunked(&self, raw_text: &str, ctx: &SourceContext<'_>) -> Result<Digest> {
        let segments = self.segmenter.segment(raw_text);
        let total = segments.len();
        info!(
            "Chunked synthesis: {} bytes in {} segments (window={}, overlap={})",
            raw_text.len(),
            total,
            self.config.segment_window,
            self.config.segment_overlap
        );

        let calls: Vec<_> = segments
            .iter()
            .map(|segment| {
                extract_segment(
                    self.service.clone(),
                    prompts::extract(segment, total, ctx),
                    segment.index,
                    total,
                )
            })
            .collect();
        let extractions: Vec<Option<String>> = stream::iter(calls)
            .buffered(self.config.map_concurrency.max(1))
            .collect()
            .await;

        let successes: Vec<String> = extractions.into_iter().flatten().collect();
        if successes.is_empty() {
            warn!("All {} segment extractions failed", total);
            return Err(Error::TotalSynthesisFailure { attempted: total });
        }
        if successes.len() < total {
            warn!(
                "{} of {} segments failed; reducing over the rest",
                total - successes.len(),
                total
            );
        }

        let notes = successes.join("\n\n");
        let parsed = match self
            .service
            .generate(&prompts::reduce(&notes, total, ctx), false)
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => parser::parse(&reply),
            Ok(_) => {
                warn!("Reduce returned an empty reply; using combined extractions");
                parser::parse(&notes)
            }
            Err(e) => {
                warn!("Reduce failed ({}); using combined extractions", e);
                parser::parse(&notes)
            }
        };

        Ok(into_digest(parsed, true, total))
    }
}

/// One Map call. Empty or failed extractions count as failures.
async fn extract_segment(
    service: Arc<dyn GenerativeTextService>,
    prompt: String,
    index: usize,
    total: usize,
) -> Option<String> {
    match service.generate(&prompt, false).await {
        Ok(reply) if !reply.trim().is_empty() => {
            debug!("Segment {}/{} extracted {} bytes", index + 1, total, reply.len());
            Some(reply.trim().to_string())
        }
        Ok(_) => {
            warn!("Segment {}/{} returned an empty extraction", index + 1, total);
            None
        }
        Err(e) => {
            warn!("Segment {}/{} failed: {}", index + 1, total, e);
            None
        }
    }
}

fn into_digest(parsed: ParsedDigest, was_chunked: bool, chunk_count: usize) -> Digest {
    Digest {
        plain_summary: parsed.plain_summary,
        structured_summary: parsed.summary,
        structured_key_points: parsed.key_points,
        was_chunked,
        chunk_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_llm::ScriptedService;

    const REPLY: &str = "Key Points:\n- **Growth:** up 10%\nSummary:\nSales rose steadily.";

    fn engine(service: Arc<ScriptedService>) -> SynthesisEngine {
        SynthesisEngine::new(service, SynthesisConfig::default()).unwrap()
    }

    fn latin(len: usize) -> String {
        let text = "lorem ipsum dolor sit amet ".repeat(len / 27 + 1);
        text[..len].to_string()
    }

    #[tokio::test]
    async fn test_threshold_routes_direct() {
        let service = Arc::new(ScriptedService::new().otherwise(REPLY));
        let digest = engine(service.clone()).synthesize(&latin(30_000)).await.unwrap();
        assert!(!digest.was_chunked);
        assert_eq!(digest.chunk_count, 1);
        assert_eq!(service.call_count(), 1);
    }

    #[tokio::test]
    async fn test_threshold_plus_one_routes_chunked() {
        let service = Arc::new(
            ScriptedService::new()
                .on("Extract the key facts", "- fact")
                .on("Combine these notes", REPLY),
        );
        let digest = engine(service.clone()).synthesize(&latin(30_001)).await.unwrap();
        assert!(digest.was_chunked);
        assert_eq!(digest.chunk_count, 4);
        assert_eq!(service.count_matching("Extract the key facts"), 4);
        assert_eq!(service.count_matching("Combine these notes"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_chunked_synthesis_runs_on_spawned_task() {
        let service = Arc::new(
            ScriptedService::new()
                .on("Extract the key facts", "- fact")
                .on("Combine these notes", REPLY),
        );
        let engine = Arc::new(engine(service.clone()));
        let text = latin(45_000);

        let task = tokio::spawn({
            let engine = engine.clone();
            async move { engine.synthesize(&text).await }
        });
        let digest = task.await.unwrap().unwrap();

        assert!(digest.was_chunked);
        assert_eq!(digest.chunk_count, 5);
        assert_eq!(service.count_matching("Extract the key facts"), 5);
    }

    #[tokio::test]
    async fn test_direct_sends_bounded_prefix() {
        let service = Arc::new(ScriptedService::new().otherwise(REPLY));
        let config = SynthesisConfig {
            direct_prefix: 50,
            ..SynthesisConfig::default()
        };
        let engine = SynthesisEngine::new(service.clone(), config).unwrap();
        engine.synthesize(&"z".repeat(500)).await.unwrap();
        let prompt = &service.calls()[0].prompt;
        assert!(prompt.ends_with(&"z".repeat(50)));
        assert!(!prompt.contains(&"z".repeat(51)));
    }

    #[tokio::test]
    async fn test_direct_failure_is_total() {
        let service = Arc::new(ScriptedService::new());
        let result = engine(service).synthesize("short text").await;
        assert!(matches!(result, Err(Error::TotalSynthesisFailure { attempted: 1 })));
    }

    #[tokio::test]
    async fn test_reduce_consumes_extractions_in_order() {
        let service = Arc::new(
            ScriptedService::new()
                .on("part 1 of 3", "- first")
                .on("part 2 of 3", "- second")
                .on("part 3 of 3", "- third")
                .on("Combine these notes", REPLY),
        );
        let config = SynthesisConfig {
            chunk_threshold: 100,
            segment_window: 100,
            segment_overlap: 10,
            map_concurrency: 3,
            ..SynthesisConfig::default()
        };
        let engine = SynthesisEngine::new(service.clone(), config).unwrap();
        let digest = engine.synthesize(&latin(250)).await.unwrap();
        assert_eq!(digest.chunk_count, 3);

        let reduce = service
            .calls()
            .into_iter()
            .find(|c| c.prompt.contains("Combine these notes"))
            .unwrap();
        assert!(reduce.prompt.ends_with("- first\n\n- second\n\n- third"));
    }

    #[tokio::test]
    async fn test_reduce_failure_parses_extractions() {
        let service = Arc::new(
            ScriptedService::new()
                .fail_on("Combine these notes")
                .on("Extract the key facts", "- a fact"),
        );
        let config = SynthesisConfig {
            chunk_threshold: 10,
            segment_window: 10,
            segment_overlap: 0,
            ..SynthesisConfig::default()
        };
        let engine = SynthesisEngine::new(service, config).unwrap();
        let digest = engine.synthesize(&latin(25)).await.unwrap();
        assert!(digest.was_chunked);
        assert_eq!(digest.chunk_count, 3);
        assert!(digest.plain_summary.contains("a fact"));
    }

    #[tokio::test]
    async fn test_empty_extractions_count_as_failures() {
        let service = Arc::new(
            ScriptedService::new()
                .on("Extract the key facts", "   ")
                .on("Combine these notes", REPLY),
        );
        let config = SynthesisConfig {
            chunk_threshold: 10,
            segment_window: 10,
            segment_overlap: 0,
            ..SynthesisConfig::default()
        };
        let engine = SynthesisEngine::new(service.clone(), config).unwrap();
        let result = engine.synthesize(&latin(25)).await;
        assert!(matches!(result, Err(Error::TotalSynthesisFailure { attempted: 3 })));
        assert_eq!(service.count_matching("Combine these notes"), 0);
    }

    #[test]
    fn test_invalid_segment_config_is_rejected() {
        let config = SynthesisConfig {
            segment_window: 10,
            segment_overlap: 10,
            ..SynthesisConfig::default()
        };
        let service = Arc::new(ScriptedService::new());
        assert!(matches!(
            SynthesisEngine::new(service, config),
            Err(Error::Config(_))
        ));
    }
}
