//! External LLM provider request/response implementations.
//!
//! OpenAI and Groq share the chat-completions format. Anthropic and Gemini
//! each have their own. All calls are single non-streaming requests.

use std::time::Duration;

use async_trait::async_trait;
use insight_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::service::GenerativeTextService;
use crate::types::{GenerationOptions, LLMProvider, ResolvedProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A [`GenerativeTextService`] backed by one vendor HTTP API.
pub struct HttpGenerator {
    client: Client,
    resolved: ResolvedProvider,
    options: GenerationOptions,
    name: String,
}

impl HttpGenerator {
    pub fn new(resolved: ResolvedProvider, options: GenerationOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let name = resolved.provider.to_string();
        Ok(Self {
            client,
            resolved,
            options,
            name,
        })
    }

    pub fn provider(&self) -> LLMProvider {
        self.resolved.provider
    }

    fn endpoint(&self) -> String {
        match self.resolved.provider {
            LLMProvider::OpenAI => OPENAI_URL.to_string(),
            LLMProvider::Groq => GROQ_URL.to_string(),
            LLMProvider::Anthropic => ANTHROPIC_URL.to_string(),
            LLMProvider::Gemini => format!("{}/{}:generateContent", GEMINI_BASE, self.resolved.model),
        }
    }
}

#[async_trait]
impl GenerativeTextService for HttpGenerator {
    async fn generate(&self, prompt: &str, expect_structured: bool) -> Result<String> {
        let provider = self.resolved.provider;
        let body = request_body(
            provider,
            &self.resolved.model,
            prompt,
            expect_structured,
            &self.options,
        );

        debug!(
            "Calling {} model {} ({} byte prompt, structured={})",
            provider,
            self.resolved.model,
            prompt.len(),
            expect_structured
        );

        let request = self.client.post(self.endpoint()).json(&body);
        let request = match provider {
            LLMProvider::OpenAI | LLMProvider::Groq => {
                request.header("Authorization", format!("Bearer {}", self.resolved.api_key))
            }
            LLMProvider::Anthropic => request
                .header("x-api-key", &self.resolved.api_key)
                .header("anthropic-version", "2023-06-01"),
            LLMProvider::Gemini => request.query(&[("key", self.resolved.api_key.as_str())]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::ServiceUnavailable(format!("{} request failed: {}", provider, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("{} API error {}", provider, status);
            return Err(Error::ServiceUnavailable(format!(
                "{} API error {}: {}",
                provider, status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::MalformedOutput(format!("{} response was not JSON: {}", provider, e)))?;

        extract_text(provider, &payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build the JSON request body for `provider`.
pub fn request_body(
    provider: LLMProvider,
    model: &str,
    prompt: &str,
    expect_structured: bool,
    options: &GenerationOptions,
) -> Value {
    match provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let mut body = json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": options.temperature,
                "max_tokens": options.max_tokens,
            });
            if expect_structured {
                body["response_format"] = json!({"type": "json_object"});
            }
            body
        }
        LLMProvider::Anthropic => json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        }),
        LLMProvider::Gemini => {
            let mut generation_config = json!({
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens,
            });
            if expect_structured {
                generation_config["responseMimeType"] = json!("application/json");
            }
            json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                "generationConfig": generation_config,
            })
        }
    }
}

/// Pull the completion text out of a provider response.
pub fn extract_text(provider: LLMProvider, payload: &Value) -> Result<String> {
    let text = match provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            payload["choices"][0]["message"]["content"].as_str().map(str::to_string)
        }
        LLMProvider::Anthropic => payload["content"].as_array().map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        }),
        LLMProvider::Gemini => payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            }),
    };

    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(Error::MalformedOutput(format!(
            "{} response contained no text",
            provider
        ))),
    }
}
