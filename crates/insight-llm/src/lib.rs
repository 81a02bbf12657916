//! Generative text service with external LLM providers (OpenAI/Anthropic/Groq/Gemini).
//!
//! The pipeline only sees [`GenerativeTextService`]; which vendor answers is
//! decided by [`LLMConfig`]. Calls go to external APIs, no local model required.

pub mod config;
pub mod providers;
pub mod scripted;
pub mod service;
pub mod types;

pub use config::LLMConfig;
pub use providers::HttpGenerator;
pub use scripted::ScriptedService;
pub use service::{create_generator, GenerativeTextService, NoopGenerator};
pub use types::*;
