//! Source routing: decide which normalizer handles a user-supplied source.

use std::path::PathBuf;

use insight_core::{Error, Result, SourceContent};
use tracing::info;

use crate::normalize::{extract_video_id, is_valid_url, normalize_pdf_file, TranscriptFetcher, WebScraper};

/// A source as named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    PdfFile(PathBuf),
    Video(String),
    Web(String),
}

impl SourceSpec {
    /// Route a raw argument: video URLs first, then other http(s) URLs, then
    /// anything ending in `.pdf` as a local file.
    pub fn parse(arg: &str) -> Result<Self> {
        let arg = arg.trim();
        if arg.starts_with("http://") || arg.starts_with("https://") {
            if extract_video_id(arg).is_some() {
                return Ok(SourceSpec::Video(arg.to_string()));
            }
            if is_valid_url(arg) {
                return Ok(SourceSpec::Web(arg.to_string()));
            }
        } else if arg.to_ascii_lowercase().ends_with(".pdf") {
            return Ok(SourceSpec::PdfFile(PathBuf::from(arg)));
        }
        Err(Error::Config(format!(
            "unrecognized source (expected a .pdf path, video URL or web URL): {}",
            arg
        )))
    }
}

/// Holds the network fetchers so they are built once per run.
pub struct Normalizer {
    web: WebScraper,
    video: TranscriptFetcher,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            web: WebScraper::new()?,
            video: TranscriptFetcher::new()?,
        })
    }

    pub async fn load(&self, spec: &SourceSpec) -> Result<SourceContent> {
        let source = match spec {
            SourceSpec::PdfFile(path) => normalize_pdf_file(path)?,
            SourceSpec::Video(url) => self.video.fetch(url).await?,
            SourceSpec::Web(url) => self.web.fetch(url).await?,
        };
        info!(
            "Normalized {} source '{}' ({} bytes)",
            source.content_type,
            source.title,
            source.raw_text.len()
        );
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routes_sources() {
        assert_eq!(
            SourceSpec::parse("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            SourceSpec::Video("https://youtu.be/dQw4w9WgXcQ".into())
        );
        assert_eq!(
            SourceSpec::parse("https://example.com/post").unwrap(),
            SourceSpec::Web("https://example.com/post".into())
        );
        assert_eq!(
            SourceSpec::parse("reports/Q3_Review.PDF").unwrap(),
            SourceSpec::PdfFile(PathBuf::from("reports/Q3_Review.PDF"))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(SourceSpec::parse("notes.txt"), Err(Error::Config(_))));
        assert!(matches!(SourceSpec::parse("https://"), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_load_missing_pdf_is_io_error() {
        let normalizer = Normalizer::new().unwrap();
        let spec = SourceSpec::PdfFile(PathBuf::from("/nonexistent/dir/report.pdf"));
        assert!(matches!(normalizer.load(&spec).await, Err(Error::Io(_))));
    }
}
