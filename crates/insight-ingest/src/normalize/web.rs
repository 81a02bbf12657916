//! Web page scraping.

use std::time::Duration;

use insight_core::{ContentType, Error, Result, SourceContent};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use tracing::{debug, info};

use super::{decode_entities, USER_AGENT};

/// Pages with less text than this are rejected.
pub const MIN_PAGE_TEXT: usize = 100;
/// Below this, paragraph text is replaced by the whole body text.
const MIN_PARAGRAPH_TEXT: usize = 200;
const UNTITLED: &str = "Untitled Webpage";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static NOISE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["script", "style", "noscript", "header", "footer", "nav"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b.*?</{tag}\s*>")).unwrap())
        .collect()
});
static META_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*(?:name|property)\s*=\s*["'](?:og:)?description["'][^>]*>"#)
        .unwrap()
});
static CONTENT_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)content\s*=\s*["']([^"']*)["']"#).unwrap());
static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>").unwrap());
static BODY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Check that a URL is absolute http(s) with a host.
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some(),
        Err(_) => false,
    }
}

/// Fetches pages and reduces them to readable text.
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch `url` and normalize it into a weblink source.
    pub async fn fetch(&self, url: &str) -> Result<SourceContent> {
        if !is_valid_url(url) {
            return Err(Error::NoUsableText(format!("invalid URL: {}", url)));
        }

        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Http(format!("{} returned {}", url, response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("reading {} failed: {}", url, e)))?;

        let (title, content) = extract_page(&html);
        if content.trim().len() < MIN_PAGE_TEXT {
            return Err(Error::NoUsableText(format!(
                "{} does not contain enough text content",
                url
            )));
        }

        info!("Scraped {} bytes from {}", content.len(), url);

        Ok(SourceContent {
            content_type: ContentType::Weblink,
            raw_text: content,
            title,
            origin_identifier: url.to_string(),
        })
    }
}

/// Extract `(title, text)` from an HTML document.
///
/// Text prefers `<p>` content; short pages fall back to the whole body. The
/// meta description, when present, is prepended as its own paragraph.
pub fn extract_page(html: &str) -> (String, String) {
    let title = TITLE_RE
        .captures(html)
        .map(|c| collapse(&c[1]))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let description = META_TAG_RE
        .find(html)
        .and_then(|m| CONTENT_ATTR_RE.captures(m.as_str()))
        .map(|c| collapse(&c[1]))
        .unwrap_or_default();

    let mut cleaned = html.to_string();
    for re in NOISE_RES.iter() {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }

    let paragraphs: Vec<String> = PARAGRAPH_RE
        .captures_iter(&cleaned)
        .map(|c| collapse(&c[1]))
        .filter(|p| !p.is_empty())
        .collect();
    let paragraph_text = paragraphs.join(" ");

    let mut content = if paragraph_text.len() < MIN_PARAGRAPH_TEXT {
        let body = BODY_RE
            .captures(&cleaned)
            .map(|c| c[1].to_string())
            .unwrap_or(cleaned.clone());
        collapse(&body)
    } else {
        paragraph_text
    };

    if !description.is_empty() && !content.starts_with(&description) {
        content = format!("{}\n\n{}", description, content);
    }

    (title, content)
}

/// Strip tags, decode entities and collapse whitespace.
fn collapse(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, " ");
    let text = decode_entities(&text);
    WS_RE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/article"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_extract_page_prefers_paragraphs() {
        let long = "Customer satisfaction rose sharply after the redesign. ".repeat(5);
        let html = format!(
            "<html><head><title> Quarterly   Review </title>\
             <script>var x = '<p>not content</p>';</script></head>\
             <body><nav>Home | About</nav><p>{}</p><p>Second &amp; last.</p>\
             <footer>Copyright</footer></body></html>",
            long
        );
        let (title, content) = extract_page(&html);
        assert_eq!(title, "Quarterly Review");
        assert!(content.starts_with("Customer satisfaction"));
        assert!(content.ends_with("Second & last."));
        assert!(!content.contains("not content"));
        assert!(!content.contains("Home | About"));
        assert!(!content.contains("Copyright"));
    }

    #[test]
    fn test_extract_page_short_paragraphs_use_body() {
        let html = "<html><body><div>Some body text</div><p>tiny</p></body></html>";
        let (title, content) = extract_page(html);
        assert_eq!(title, UNTITLED);
        assert_eq!(content, "Some body text tiny");
    }

    #[test]
    fn test_extract_page_prepends_description() {
        let html = r#"<html><head><meta name="description" content="A short summary."></head>
            <body><div>Body words here</div></body></html>"#;
        let (_, content) = extract_page(html);
        assert_eq!(content, "A short summary.\n\nBody words here");
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let scraper = WebScraper::new().unwrap();
        let result = scraper.fetch("not a url").await;
        assert!(matches!(result, Err(Error::NoUsableText(_))));
    }
}
