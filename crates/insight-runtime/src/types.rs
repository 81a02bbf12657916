//! Runtime types.

use chrono::{DateTime, Utc};
use insight_core::{Category, ContentType, DocumentRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of ingesting (or regenerating) one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    /// Digest and relevance map are present.
    Complete(DocumentRecord),
    /// Synthesis failed outright; the document is kept without a digest.
    Degraded(PartialDocument),
}

impl IngestOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            IngestOutcome::Complete(r) => r.id,
            IngestOutcome::Degraded(p) => p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            IngestOutcome::Complete(r) => &r.title,
            IngestOutcome::Degraded(p) => &p.title,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, IngestOutcome::Complete(_))
    }

    pub fn into_record(self) -> Option<DocumentRecord> {
        match self {
            IngestOutcome::Complete(r) => Some(r),
            IngestOutcome::Degraded(_) => None,
        }
    }
}

/// A document whose synthesis could not produce any digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialDocument {
    pub id: Uuid,
    pub content_type: ContentType,
    pub category: Category,
    pub title: String,
    pub origin_identifier: String,
    pub raw_text: String,
    pub content_hash: String,
    /// Why synthesis failed.
    pub failure: String,
    pub attempted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_serializes_with_status_tag() {
        let outcome = IngestOutcome::Degraded(PartialDocument {
            id: Uuid::nil(),
            content_type: ContentType::Weblink,
            category: Category::TechnologyNews,
            title: "Post".into(),
            origin_identifier: "https://example.com".into(),
            raw_text: "text".into(),
            content_hash: "abc".into(),
            failure: "all segments failed".into(),
            attempted_at: Utc::now(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["category"], "Technology News");
        assert_eq!(json["content_type"], "weblink");
        assert!(!outcome.is_complete());
        assert_eq!(outcome.title(), "Post");
        assert!(outcome.into_record().is_none());
    }
}
