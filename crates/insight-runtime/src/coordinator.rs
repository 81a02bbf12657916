//! Coordinator: classify, synthesize, then attach relevance for one document.

use std::sync::Arc;

use chrono::Utc;
use insight_core::{
    AudienceRegistry, ContentType, DocumentRecord, PipelineConfig, Result, SourceContent,
};
use insight_ingest::content_hash;
use insight_llm::GenerativeTextService;
use insight_synth::{
    Classifier, RelevanceContext, RelevanceGenerator, SourceContext, SynthesisEngine,
    TitleGenerator,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{IngestOutcome, PartialDocument};

/// Fields carried from a source or an existing record into a pipeline run.
struct Draft {
    id: Uuid,
    content_type: ContentType,
    title: String,
    origin_identifier: String,
    raw_text: String,
}

/// Top-level coordinator shared by every ingestion in a run.
pub struct Coordinator {
    classifier: Classifier,
    engine: SynthesisEngine,
    relevance: RelevanceGenerator,
    titles: TitleGenerator,
    audiences: AudienceRegistry,
}

impl Coordinator {
    /// Build every stage around one shared service.
    pub fn new(
        service: Arc<dyn GenerativeTextService>,
        pipeline: &PipelineConfig,
        audiences: AudienceRegistry,
    ) -> Result<Self> {
        pipeline.validate()?;
        info!(
            "Coordinator initialized: service={}, audiences={}, chunk_threshold={}",
            service.name(),
            audiences.len(),
            pipeline.synthesis.chunk_threshold
        );
        Ok(Self {
            classifier: Classifier::new(service.clone(), pipeline.classifier_sample),
            engine: SynthesisEngine::new(service.clone(), pipeline.synthesis.clone())?,
            relevance: RelevanceGenerator::new(service.clone(), pipeline.relevance.clone()),
            titles: TitleGenerator::new(service),
            audiences,
        })
    }

    pub fn audiences(&self) -> &AudienceRegistry {
        &self.audiences
    }

    /// Run a freshly normalized source through the pipeline.
    ///
    /// PDF titles come from file names, so unclear ones are replaced by a
    /// generated title first.
    pub async fn ingest(&self, source: SourceContent) -> IngestOutcome {
        let title = match source.content_type {
            ContentType::Pdf => self.titles.friendly_title(&source.title).await,
            _ => source.title,
        };
        self.run(Draft {
            id: Uuid::new_v4(),
            content_type: source.content_type,
            title,
            origin_identifier: source.origin_identifier,
            raw_text: source.raw_text,
        })
        .await
    }

    /// Re-run the pipeline for an existing record. Id, title and origin are
    /// kept; category, digest and relevance are replaced wholesale.
    pub async fn regenerate(&self, record: DocumentRecord) -> IngestOutcome {
        info!("Regenerating document {}", record.id);
        self.run(Draft {
            id: record.id,
            content_type: record.content_type,
            title: record.title,
            origin_identifier: record.origin_identifier,
            raw_text: record.raw_text,
        })
        .await
    }

    async fn run(&self, draft: Draft) -> IngestOutcome {
        let start = std::time::Instant::now();
        let category = self
            .classifier
            .classify(&draft.raw_text, Some(&draft.title))
            .await;

        let ctx = SourceContext {
            content_type: Some(draft.content_type),
            title: Some(&draft.title),
        };
        let digest = match self.engine.synthesize_source(&draft.raw_text, &ctx).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Synthesis failed for {} ('{}'): {}", draft.id, draft.title, e);
                return IngestOutcome::Degraded(PartialDocument {
                    id: draft.id,
                    content_type: draft.content_type,
                    category,
                    content_hash: content_hash(&draft.raw_text),
                    title: draft.title,
                    origin_identifier: draft.origin_identifier,
                    raw_text: draft.raw_text,
                    failure: e.to_string(),
                    attempted_at: Utc::now(),
                });
            }
        };

        let relevance_map = self
            .relevance
            .generate_relevance(
                &RelevanceContext {
                    title: &draft.title,
                    category,
                    digest: &digest,
                    raw_text: &draft.raw_text,
                },
                &self.audiences,
            )
            .await;

        info!(
            "Document {} complete: category={}, chunked={}, chunks={}, audiences={}, duration={}ms",
            draft.id,
            category,
            digest.was_chunked,
            digest.chunk_count,
            relevance_map.len(),
            start.elapsed().as_millis()
        );

        IngestOutcome::Complete(DocumentRecord {
            id: draft.id,
            content_type: draft.content_type,
            category,
            title: draft.title,
            origin_identifier: draft.origin_identifier,
            content_hash: content_hash(&draft.raw_text),
            raw_text: draft.raw_text,
            digest,
            relevance_map,
            synthesis_generated_at: Utc::now(),
        })
    }
}
