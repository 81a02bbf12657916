//! Video transcript fetching (YouTube).

use std::time::Duration;

use insight_core::{ContentType, Error, Result, SourceContent};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{decode_entities, USER_AGENT};

/// Caption languages tried in order.
pub const TRANSCRIPT_LANGUAGES: &[&str] = &["en", "en-US"];
const UNTITLED: &str = "Untitled YouTube Video";

static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Deserialize)]
struct OEmbed {
    title: Option<String>,
}

/// Extract a video id from watch, short, shorts and embed URLs, or a bare id.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if BARE_ID_RE.is_match(url) {
        return Some(url.to_string());
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let path = parsed.path();

    let id = match host {
        "youtu.be" => path.trim_start_matches('/').split('/').next().map(str::to_string),
        "youtube.com" if path == "/watch" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned()),
        "youtube.com" => path
            .strip_prefix("/shorts/")
            .or_else(|| path.strip_prefix("/embed/"))
            .and_then(|rest| rest.split('/').next())
            .map(str::to_string),
        _ => None,
    };

    id.filter(|id| !id.is_empty())
}

/// Join the caption lines of a timed-text XML document.
///
/// Caption text is escaped twice (`&amp;#39;`): the reader resolves the XML
/// layer, then the entity pass resolves what the captions themselves carry.
pub fn parse_timed_text(xml: &str) -> String {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut lines = Vec::new();
    let mut in_caption = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"text" => in_caption = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"text" => in_caption = false,
            Ok(Event::Text(t)) if in_caption => {
                let once = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(e) => {
                        debug!("Keeping raw caption text: {}", e);
                        String::from_utf8_lossy(&t).into_owned()
                    }
                };
                let line = WS_RE.replace_all(&decode_entities(&once), " ").trim().to_string();
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("Malformed caption XML after {} lines: {}", lines.len(), e);
                break;
            }
            _ => {}
        }
    }
    lines.join(" ")
}

/// Fetches a video's title and caption transcript.
pub struct TranscriptFetcher {
    client: Client,
}

impl TranscriptFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Normalize a video URL (or id) into a source whose text is the transcript.
    pub async fn fetch(&self, url: &str) -> Result<SourceContent> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| Error::NoUsableText(format!("not a recognizable video URL: {}", url)))?;

        let title = self.fetch_title(&video_id).await;
        let transcript = self.fetch_transcript(&video_id).await?;

        info!(
            "Fetched transcript for video {} ({} bytes)",
            video_id,
            transcript.len()
        );

        Ok(SourceContent {
            content_type: ContentType::Video,
            raw_text: transcript,
            title,
            origin_identifier: video_id,
        })
    }

    async fn fetch_title(&self, video_id: &str) -> String {
        let oembed_url = format!(
            "https://www.youtube.com/oembed?url=https://www.youtube.com/watch?v={}&format=json",
            video_id
        );

        let result: std::result::Result<OEmbed, reqwest::Error> = async {
            let resp = self.client.get(&oembed_url).send().await?.error_for_status()?;
            resp.json::<OEmbed>().await
        }
        .await;

        match result {
            Ok(OEmbed { title: Some(t) }) if !t.trim().is_empty() => t.trim().to_string(),
            Ok(_) => UNTITLED.to_string(),
            Err(e) => {
                warn!("Could not fetch video info for {}: {}", video_id, e);
                UNTITLED.to_string()
            }
        }
    }

    async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
        for lang in TRANSCRIPT_LANGUAGES {
            let url = format!(
                "https://www.youtube.com/api/timedtext?lang={}&v={}",
                lang, video_id
            );
            debug!("Requesting {} captions for {}", lang, video_id);

            let resp = match self.client.get(&url).send().await {
                Ok(r) if r.status().is_success() => r,
                Ok(r) => {
                    debug!("Captions {} for {}: status {}", lang, video_id, r.status());
                    continue;
                }
                Err(e) => return Err(Error::Http(format!("caption request failed: {}", e))),
            };

            let xml = resp
                .text()
                .await
                .map_err(|e| Error::Http(format!("reading captions failed: {}", e)))?;
            let transcript = parse_timed_text(&xml);
            if !transcript.is_empty() {
                return Ok(transcript);
            }
        }

        warn!("No transcript available for video {}", video_id);
        Err(Error::NoUsableText(format!(
            "no transcript available for video {}",
            video_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_forms() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), id);
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(extract_video_id("https://youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), id);
    }

    #[test]
    fn test_extract_video_id_rejects_other_urls() {
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn test_parse_timed_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.0" dur="1.5">Welcome   back</text>
            <text start="1.5" dur="2.0">it&amp;#39;s a &amp;quot;demo&amp;quot;</text>
            <text start="3.5" dur="1.0">   </text>
            </transcript>"#;
        assert_eq!(parse_timed_text(xml), "Welcome back it's a \"demo\"");
    }

    #[test]
    fn test_parse_timed_text_numeric_references() {
        let xml = r#"<transcript><text start="0" dur="1">it&amp;#8217;s &amp;#x2014; fine</text><text start="1" dur="1">Q&amp;A</text></transcript>"#;
        assert_eq!(parse_timed_text(xml), "it\u{2019}s \u{2014} fine Q&A");
    }

    #[test]
    fn test_parse_timed_text_stops_at_malformed_xml() {
        let xml = r#"<transcript><text start="0">kept</text><text start="1">also</wrong><text start="2">dropped</text></transcript>"#;
        assert_eq!(parse_timed_text(xml), "kept also");
    }

    #[test]
    fn test_parse_timed_text_empty() {
        assert_eq!(parse_timed_text("<transcript></transcript>"), "");
    }
}
