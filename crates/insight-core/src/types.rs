//! Document model shared by every pipeline stage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of source a document was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Pdf,
    Weblink,
    Video,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Pdf => write!(f, "pdf"),
            ContentType::Weblink => write!(f, "weblink"),
            ContentType::Video => write!(f, "video"),
        }
    }
}

/// Canonical text + metadata produced by a content normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceContent {
    pub content_type: ContentType,
    pub raw_text: String,
    pub title: String,
    /// File path, URL, or video id.
    pub origin_identifier: String,
}

/// Closed set of document categories. The first variant is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Industry Insights")]
    IndustryInsights,
    #[serde(rename = "Technology News")]
    TechnologyNews,
    #[serde(rename = "Product Management")]
    ProductManagement,
    #[serde(rename = "Customer Service")]
    CustomerService,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 4] = [
        Category::IndustryInsights,
        Category::TechnologyNews,
        Category::ProductManagement,
        Category::CustomerService,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::IndustryInsights => "Industry Insights",
            Category::TechnologyNews => "Technology News",
            Category::ProductManagement => "Product Management",
            Category::CustomerService => "Customer Service",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::ALL[0]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Inline span inside a structured entry body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Strong(String),
    SoftBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Paragraph,
    Bullet,
}

/// One paragraph or bullet of a [`StructuredBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: Vec<Inline>,
}

impl BlockEntry {
    pub fn paragraph(body: Vec<Inline>) -> Self {
        Self {
            kind: EntryKind::Paragraph,
            title: None,
            body,
        }
    }

    pub fn bullet(title: Option<String>, body: Vec<Inline>) -> Self {
        Self {
            kind: EntryKind::Bullet,
            title,
            body,
        }
    }

    /// Body flattened to text; soft breaks become newlines.
    pub fn body_text(&self) -> String {
        let mut out = String::new();
        for span in &self.body {
            match span {
                Inline::Text(t) | Inline::Strong(t) => out.push_str(t),
                Inline::SoftBreak => out.push('\n'),
            }
        }
        out
    }
}

/// Ordered list of entries; renderers decide the presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredBlock {
    pub entries: Vec<BlockEntry>,
}

impl StructuredBlock {
    pub fn new(entries: Vec<BlockEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bullets(&self) -> impl Iterator<Item = &BlockEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Bullet)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &BlockEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Paragraph)
    }

    /// Plain-text rendering: bullets as `- Title: body`, paragraphs separated by blank lines.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let body = entry.body_text();
            let line = match (&entry.kind, &entry.title) {
                (EntryKind::Bullet, Some(title)) => format!("- {}: {}", title, body),
                (EntryKind::Bullet, None) => format!("- {}", body),
                (EntryKind::Paragraph, Some(title)) => format!("{}: {}", title, body),
                (EntryKind::Paragraph, None) => body,
            };
            lines.push(line);
        }

        let separator = if self.entries.iter().all(|e| e.kind == EntryKind::Bullet) {
            "\n"
        } else {
            "\n\n"
        };
        lines.join(separator)
    }

    /// HTML fragment rendering: consecutive bullets share one `<ul>`.
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        let mut in_list = false;

        for entry in &self.entries {
            match entry.kind {
                EntryKind::Bullet => {
                    if !in_list {
                        html.push_str("<ul>");
                        in_list = true;
                    }
                    html.push_str("<li>");
                    if let Some(title) = &entry.title {
                        html.push_str(&format!("<strong>{}:</strong> ", escape_html(title)));
                    }
                    push_inline_html(&mut html, &entry.body);
                    html.push_str("</li>");
                }
                EntryKind::Paragraph => {
                    if in_list {
                        html.push_str("</ul>");
                        in_list = false;
                    }
                    html.push_str("<p>");
                    push_inline_html(&mut html, &entry.body);
                    html.push_str("</p>");
                }
            }
        }
        if in_list {
            html.push_str("</ul>");
        }
        html
    }
}

fn push_inline_html(html: &mut String, body: &[Inline]) {
    for span in body {
        match span {
            Inline::Text(t) => html.push_str(&escape_html(t)),
            Inline::Strong(t) => {
                html.push_str("<strong>");
                html.push_str(&escape_html(t));
                html.push_str("</strong>");
            }
            Inline::SoftBreak => html.push_str("<br>"),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Key points + summary for one document, produced whole by one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub plain_summary: String,
    pub structured_summary: StructuredBlock,
    pub structured_key_points: StructuredBlock,
    pub was_chunked: bool,
    pub chunk_count: usize,
}

/// A slice of a long document used for one Map call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub index: usize,
    /// Byte offset (inclusive).
    pub start: usize,
    /// Byte offset (exclusive).
    pub end: usize,
    pub text: String,
}

/// A named organizational role that receives a tailored relevance statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceProfile {
    pub id: String,
    pub context_description: String,
}

impl AudienceProfile {
    pub fn new(id: impl Into<String>, context_description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context_description: context_description.into(),
        }
    }
}

/// Where a relevance statement's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementOrigin {
    Generated,
    CategoryFallback,
    GenericFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceStatement {
    pub audience_id: String,
    pub text: String,
    pub origin: StatementOrigin,
}

/// A fully synthesized document, handed to the caller after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub content_type: ContentType,
    pub category: Category,
    pub title: String,
    pub origin_identifier: String,
    pub raw_text: String,
    /// SHA-256 of `raw_text`, hex encoded.
    pub content_hash: String,
    pub digest: Digest,
    pub relevance_map: BTreeMap<String, RelevanceStatement>,
    pub synthesis_generated_at: DateTime<Utc>,
}
