//! Insight Synth: turns raw document text into a [`Digest`], a category and
//! per-audience relevance statements.
//!
//! Every model call goes through an injected
//! [`GenerativeTextService`](insight_llm::GenerativeTextService); malformed or
//! failed replies are recovered here and never reach callers, except a
//! document whose synthesis failed outright.
//!
//! [`Digest`]: insight_core::Digest

pub mod classifier;
pub mod engine;
pub mod fallback;
mod json;
pub mod parser;
mod prompts;
pub mod relevance;
pub mod title;

pub use classifier::Classifier;
pub use engine::{SourceContext, SynthesisEngine};
pub use parser::{parse, scan, ParsedDigest, SectionScan};
pub use relevance::{RelevanceContext, RelevanceGenerator};
pub use title::TitleGenerator;
