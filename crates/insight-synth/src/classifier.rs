//! Category classifier.

use std::sync::Arc;

use insight_core::Category;
use insight_ingest::prefix;
use insight_llm::GenerativeTextService;
use tracing::{debug, warn};

use crate::json::string_field;
use crate::prompts;

/// Assigns one [`Category`] to a document. Never fails: anything unusable
/// resolves to the default category.
pub struct Classifier {
    service: Arc<dyn GenerativeTextService>,
    sample_len: usize,
}

impl Classifier {
    pub fn new(service: Arc<dyn GenerativeTextService>, sample_len: usize) -> Self {
        Self {
            service,
            sample_len,
        }
    }

    pub async fn classify(&self, text: &str, hint_title: Option<&str>) -> Category {
        let sample = prefix(text, self.sample_len);
        let prompt = prompts::classify(sample, hint_title);

        let reply = match self.service.generate(&prompt, true).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Classification call failed, using default category: {}", e);
                return Category::default();
            }
        };

        let label = match string_field(&reply, "category") {
            Some(label) => label,
            None => {
                warn!("Unparsable classification reply, using default category");
                return Category::default();
            }
        };

        let category = coerce_category(&label).unwrap_or_else(|| {
            debug!("Unknown category label '{}', using default", label);
            Category::default()
        });
        debug!("Classified as {}", category);
        category
    }
}

/// Exact name first, then case-insensitive containment of a known name.
pub fn coerce_category(label: &str) -> Option<Category> {
    let label = label.trim();
    if let Some(exact) = Category::ALL.into_iter().find(|c| c.name() == label) {
        return Some(exact);
    }
    let lowered = label.to_lowercase();
    Category::ALL
        .into_iter()
        .find(|c| lowered.contains(&c.name().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_llm::{NoopGenerator, ScriptedService};

    #[test]
    fn test_coerce_category() {
        assert_eq!(coerce_category("Technology News"), Some(Category::TechnologyNews));
        assert_eq!(coerce_category("  customer service "), Some(Category::CustomerService));
        assert_eq!(
            coerce_category("Category: product management (likely)"),
            Some(Category::ProductManagement)
        );
        assert_eq!(coerce_category("Sports"), None);
    }

    #[tokio::test]
    async fn test_classify_structured_reply() {
        let service = Arc::new(ScriptedService::new().on("Classify", r#"{"category": "Technology News"}"#));
        let classifier = Classifier::new(service.clone(), 8_000);
        let category = classifier.classify("New chips announced", Some("Chip News")).await;
        assert_eq!(category, Category::TechnologyNews);

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].expect_structured);
        assert!(calls[0].prompt.contains("Title: Chip News"));
    }

    #[tokio::test]
    async fn test_classify_sends_bounded_sample() {
        let service = Arc::new(ScriptedService::new().otherwise(r#"{"category": "Customer Service"}"#));
        let classifier = Classifier::new(service.clone(), 100);
        let text = "x".repeat(5_000);
        assert_eq!(classifier.classify(&text, None).await, Category::CustomerService);
        let prompt = &service.calls()[0].prompt;
        assert!(prompt.contains(&"x".repeat(100)));
        assert!(!prompt.contains(&"x".repeat(101)));
    }

    #[tokio::test]
    async fn test_classify_falls_back_to_default() {
        let garbage = Arc::new(ScriptedService::new().otherwise("I think it's about sports"));
        let classifier = Classifier::new(garbage, 8_000);
        assert_eq!(classifier.classify("text", None).await, Category::default());

        let unknown = Arc::new(ScriptedService::new().otherwise(r#"{"category": "Sports"}"#));
        let classifier = Classifier::new(unknown, 8_000);
        assert_eq!(classifier.classify("text", None).await, Category::IndustryInsights);

        let classifier = Classifier::new(Arc::new(NoopGenerator), 8_000);
        assert_eq!(classifier.classify("text", None).await, Category::default());
    }
}
