//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Documents longer than this (bytes) take the chunked path.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 30_000;
/// Prefix of the text sent on the direct path.
pub const DEFAULT_DIRECT_PREFIX: usize = 15_000;
pub const DEFAULT_SEGMENT_WINDOW: usize = 10_000;
pub const DEFAULT_SEGMENT_OVERLAP: usize = 500;
pub const DEFAULT_MAP_CONCURRENCY: usize = 4;
pub const DEFAULT_CLASSIFIER_SAMPLE: usize = 8_000;
pub const DEFAULT_RELEVANCE_MIN_CHARS: usize = 40;
pub const DEFAULT_RELEVANCE_MAX_CHARS: usize = 200;
pub const DEFAULT_RELEVANCE_EXCERPT: usize = 1_000;
pub const DEFAULT_RELEVANCE_CONCURRENCY: usize = 3;

/// Paths to all Insight data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// LLM provider configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
    /// Pipeline tuning (`data/pipeline.json`).
    pub pipeline_file: PathBuf,
    /// Audience registry override (`data/audiences.json`).
    pub audiences_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the root if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            llm_config_file: root.join("llm-config.json"),
            pipeline_file: root.join("pipeline.json"),
            audiences_file: root.join("audiences.json"),
            root,
        })
    }
}

/// Adaptive Synthesis Engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub chunk_threshold: usize,
    pub direct_prefix: usize,
    pub segment_window: usize,
    pub segment_overlap: usize,
    /// Maximum Map calls in flight for one document.
    pub map_concurrency: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            direct_prefix: DEFAULT_DIRECT_PREFIX,
            segment_window: DEFAULT_SEGMENT_WINDOW,
            segment_overlap: DEFAULT_SEGMENT_OVERLAP,
            map_concurrency: DEFAULT_MAP_CONCURRENCY,
        }
    }
}

/// Relevance Generator tuning. The band is inclusive and counted in chars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub min_chars: usize,
    pub max_chars: usize,
    pub excerpt_len: usize,
    pub concurrency: usize,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_RELEVANCE_MIN_CHARS,
            max_chars: DEFAULT_RELEVANCE_MAX_CHARS,
            excerpt_len: DEFAULT_RELEVANCE_EXCERPT,
            concurrency: DEFAULT_RELEVANCE_CONCURRENCY,
        }
    }
}

/// Everything the pipeline can be tuned with (`pipeline.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub synthesis: SynthesisConfig,
    pub relevance: RelevanceConfig,
    /// Bytes of text sent to the category classifier.
    pub classifier_sample: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            synthesis: SynthesisConfig::default(),
            relevance: RelevanceConfig::default(),
            classifier_sample: DEFAULT_CLASSIFIER_SAMPLE,
        }
    }
}

impl PipelineConfig {
    /// Load from file, falling back to defaults, then apply env overrides.
    pub fn load(path: &Path) -> Self {
        let mut config: PipelineConfig = match std::fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                PipelineConfig::default()
            }),
            Err(_) => PipelineConfig::default(),
        };

        if let Some(v) = env_usize("INSIGHT_CHUNK_THRESHOLD") {
            config.synthesis.chunk_threshold = v;
        }
        if let Some(v) = env_usize("INSIGHT_MAP_CONCURRENCY") {
            config.synthesis.map_concurrency = v;
        }

        config
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.synthesis;
        if s.segment_window == 0 || s.segment_overlap >= s.segment_window {
            return Err(Error::Config(format!(
                "segment window ({}) must be greater than overlap ({})",
                s.segment_window, s.segment_overlap
            )));
        }
        if s.direct_prefix == 0 || s.map_concurrency == 0 {
            return Err(Error::Config(
                "direct_prefix and map_concurrency must be positive".into(),
            ));
        }
        let r = &self.relevance;
        if r.min_chars > r.max_chars {
            return Err(Error::Config(format!(
                "relevance band is empty: {}..={}",
                r.min_chars, r.max_chars
            )));
        }
        if r.concurrency == 0 {
            return Err(Error::Config("relevance concurrency must be positive".into()));
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Top-level Insight configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Data directory paths.
    pub data_paths: DataPaths,
    pub pipeline: PipelineConfig,
}

impl InsightConfig {
    /// Create configuration from the data directory, environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_paths = DataPaths::new(data_dir)?;
        let pipeline = PipelineConfig::load(&data_paths.pipeline_file);
        pipeline.validate()?;

        info!(
            "Pipeline config: chunk_threshold={}, window={}, overlap={}",
            pipeline.synthesis.chunk_threshold,
            pipeline.synthesis.segment_window,
            pipeline.synthesis.segment_overlap
        );

        Ok(Self {
            data_paths,
            pipeline,
        })
    }
}
