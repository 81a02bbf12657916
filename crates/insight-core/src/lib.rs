//! Insight Core: document model, error taxonomy, configuration, audience registry.

pub mod audience;
pub mod config;
pub mod error;
pub mod types;

pub use audience::AudienceRegistry;
pub use config::{DataPaths, InsightConfig, PipelineConfig, RelevanceConfig, SynthesisConfig};
pub use error::{Error, Result};
pub use types::*;
