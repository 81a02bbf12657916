//! Content normalizers: turn a PDF, web page or video into [`SourceContent`].
//!
//! Each normalizer either yields canonical text + metadata or fails with
//! [`insight_core::Error::NoUsableText`].
//!
//! [`SourceContent`]: insight_core::SourceContent

pub mod pdf;
pub mod video;
pub mod web;

use quick_xml::escape::unescape_with;
use sha2::{Digest, Sha256};

pub use pdf::{normalize_pdf, normalize_pdf_file};
pub use video::{extract_video_id, TranscriptFetcher};
pub use web::{is_valid_url, WebScraper};

/// User agent sent by the web and video fetchers.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Compute SHA-256 content hash.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve character references and the entities common in scraped HTML.
/// Text that is not valid escaped markup (a bare `&`, an unknown entity) is
/// returned unchanged.
pub(crate) fn decode_entities(text: &str) -> String {
    match unescape_with(text, resolve_entity) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => text.to_string(),
    }
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    let resolved = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "hellip" => "\u{2026}",
        _ => return None,
    };
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("hello");
        assert_eq!(a.len(), 64);
        assert_eq!(a, content_hash("hello"));
        assert_ne!(a, content_hash("hello!"));
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp;lt; b &quot;c&quot;"), "a &lt; b \"c\"");
        assert_eq!(decode_entities("it&#39;s"), "it's");
        assert_eq!(decode_entities("it&#8217;s &#x2014; fine&nbsp;now"), "it\u{2019}s \u{2014} fine now");
        assert_eq!(decode_entities("Q&A with AT&T"), "Q&A with AT&T");
        assert_eq!(decode_entities("&copy; 2024"), "&copy; 2024");
    }
}
