//! LLM configuration persistence and provider selection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{GenerationOptions, LLMProvider, ResolvedProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Stored LLM configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default)]
    pub options: GenerationOptions,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}
fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            gemini_api_key: None,
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            groq_model: default_groq_model(),
            gemini_model: default_gemini_model(),
            options: GenerationOptions::default(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", config_path.display(), e);
                LLMConfig::default()
            }),
            Err(_) => LLMConfig::default(),
        };

        // Env vars as fallback for API keys
        fill_from_env(&mut config.openai_api_key, "OPENAI_API_KEY");
        fill_from_env(&mut config.anthropic_api_key, "ANTHROPIC_API_KEY");
        fill_from_env(&mut config.groq_api_key, "GROQ_API_KEY");
        fill_from_env(&mut config.gemini_api_key, "GEMINI_API_KEY");

        config
    }

    fn key_and_model(&self, provider: LLMProvider) -> (Option<&String>, &str) {
        match provider {
            LLMProvider::OpenAI => (self.openai_api_key.as_ref(), &self.openai_model),
            LLMProvider::Anthropic => (self.anthropic_api_key.as_ref(), &self.anthropic_model),
            LLMProvider::Groq => (self.groq_api_key.as_ref(), &self.groq_model),
            LLMProvider::Gemini => (self.gemini_api_key.as_ref(), &self.gemini_model),
        }
    }

    fn resolve(&self, provider: LLMProvider) -> Option<ResolvedProvider> {
        let (key, model) = self.key_and_model(provider);
        key.filter(|k| !k.trim().is_empty()).map(|k| ResolvedProvider {
            provider,
            model: model.to_string(),
            api_key: k.clone(),
        })
    }

    /// Resolve which provider, model and key to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        // Explicit preference
        if self.preferred_provider != "auto" {
            return LLMProvider::from_name(&self.preferred_provider).and_then(|p| self.resolve(p));
        }

        // Auto mode: OpenAI > Gemini > Anthropic > Groq
        [
            LLMProvider::OpenAI,
            LLMProvider::Gemini,
            LLMProvider::Anthropic,
            LLMProvider::Groq,
        ]
        .into_iter()
        .find_map(|p| self.resolve(p))
    }
}

fn fill_from_env(slot: &mut Option<String>, var: &str) {
    if slot.is_none() {
        *slot = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> LLMConfig {
        LLMConfig {
            anthropic_api_key: Some("sk-ant".into()),
            groq_api_key: Some("gsk".into()),
            ..LLMConfig::default()
        }
    }

    #[test]
    fn test_auto_prefers_in_order() {
        let resolved = keyed().resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::Anthropic);
        assert_eq!(resolved.model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(resolved.api_key, "sk-ant");
    }

    #[test]
    fn test_explicit_preference() {
        let mut config = keyed();
        config.preferred_provider = "groq".into();
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::Groq);

        config.preferred_provider = "gemini".into();
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = LLMConfig {
            preferred_provider: "openai".into(),
            openai_api_key: Some("  ".into()),
            ..LLMConfig::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        let mut config = keyed();
        config.gemini_model = "gemini-1.5-flash".into();
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = LLMConfig::load(&path);
        assert_eq!(loaded.gemini_model, "gemini-1.5-flash");
        assert_eq!(loaded.anthropic_api_key.as_deref(), Some("sk-ant"));
        assert_eq!(loaded.options, GenerationOptions::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let loaded = LLMConfig::load(&path);
        assert_eq!(loaded.preferred_provider, "auto");
        assert_eq!(loaded.openai_model, DEFAULT_OPENAI_MODEL);
    }
}
