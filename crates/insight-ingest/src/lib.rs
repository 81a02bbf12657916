//! Insight Ingest: text segmentation, content normalization, title cleanup.

pub mod normalize;
pub mod segmenter;
pub mod source;
pub mod title;

pub use normalize::{content_hash, TranscriptFetcher, WebScraper};
pub use segmenter::{prefix, Segmenter};
pub use source::{Normalizer, SourceSpec};
