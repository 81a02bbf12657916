//! Structured-output parser for model replies.
//!
//! A reply is expected to carry a key-points section and a summary section,
//! introduced by literal headers. Parsing is total: anything that does not
//! carry both headers is handled by the [`SectionScan::Unrecognized`] branch.

use insight_core::{BlockEntry, Inline, StructuredBlock};
use once_cell::sync::Lazy;
use regex::Regex;

/// Key-points header variants, in preference order.
pub const KEY_POINTS_HEADERS: [&str; 3] = ["Key Points:", "Key Insights:", "Key Takeaways:"];
pub const SUMMARY_HEADER: &str = "Summary:";

pub const UNRECOGNIZED_KEY_POINTS: &str = "Unable to extract key points from document.";
pub const EMPTY_KEY_POINTS: &str = "No key points extracted from document.";
pub const EMPTY_SUMMARY: &str = "No summary information available.";

static LEADING_DECORATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[*_]+(?:[ \t]*\r?\n|[ \t]+|$)").unwrap());
static TRAILING_DECORATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\n)[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?[*_]*[ \t]*$").unwrap()
});
static BOLD_LEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*(.+?)\*\*(.*)$").unwrap());
static STRONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static UNDERLINE_STRONG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());
static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}(?:[ \t]+|$)").unwrap());
static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n\s*").unwrap());

/// Result of locating the section headers in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionScan<'a> {
    Recognized {
        key_points_span: &'a str,
        summary_span: &'a str,
    },
    Unrecognized {
        whole_text: &'a str,
    },
}

/// Parsed reply, ready to become a `Digest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDigest {
    pub key_points: StructuredBlock,
    pub summary: StructuredBlock,
    pub plain_summary: String,
    /// Whether both section headers were found.
    pub recognized: bool,
}

/// Locate both section headers. Spans exclude the headers and any
/// decoration (`**`, `##`, `2.`) a model wrapped around them.
pub fn scan(raw: &str) -> SectionScan<'_> {
    let key_points = KEY_POINTS_HEADERS
        .iter()
        .find_map(|h| raw.find(h).map(|pos| (pos, h.len())));
    let summary = raw.find(SUMMARY_HEADER).map(|pos| (pos, SUMMARY_HEADER.len()));

    let (Some((kp, kp_len)), Some((sm, sm_len))) = (key_points, summary) else {
        return SectionScan::Unrecognized { whole_text: raw };
    };

    // Only the first span can end in the decoration of the header after it.
    let (key_points_span, summary_span) = if kp < sm {
        (
            clean_span(&raw[kp + kp_len..sm], true),
            clean_span(&raw[sm + sm_len..], false),
        )
    } else {
        (
            clean_span(&raw[kp + kp_len..], false),
            clean_span(&raw[sm + sm_len..kp], true),
        )
    };

    SectionScan::Recognized {
        key_points_span,
        summary_span,
    }
}

fn clean_span(span: &str, before_header: bool) -> &str {
    let start = LEADING_DECORATION_RE.find(span).map_or(0, |m| m.end());
    let span = &span[start..];
    let end = if before_header {
        TRAILING_DECORATION_RE
            .find(span)
            .map_or(span.len(), |m| m.start())
    } else {
        span.len()
    };
    span[..end].trim()
}

/// Parse a reply into key points, summary and plain summary. Never fails.
pub fn parse(raw: &str) -> ParsedDigest {
    match scan(raw) {
        SectionScan::Recognized {
            key_points_span,
            summary_span,
        } => ParsedDigest {
            key_points: parse_key_points(key_points_span),
            summary: parse_summary(summary_span),
            plain_summary: plain_text(summary_span),
            recognized: true,
        },
        SectionScan::Unrecognized { whole_text } => {
            let whole_text = whole_text.trim();
            let summary = if whole_text.is_empty() {
                placeholder_paragraph()
            } else {
                StructuredBlock::new(vec![BlockEntry::paragraph(parse_lines(whole_text))])
            };
            ParsedDigest {
                key_points: placeholder_bullet(UNRECOGNIZED_KEY_POINTS),
                summary,
                plain_summary: plain_text(whole_text),
                recognized: false,
            }
        }
    }
}

fn parse_key_points(span: &str) -> StructuredBlock {
    let entries: Vec<BlockEntry> = span
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let item = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))?
                .trim();
            (!item.is_empty()).then(|| bullet_entry(item))
        })
        .collect();

    if entries.is_empty() {
        placeholder_bullet(EMPTY_KEY_POINTS)
    } else {
        StructuredBlock::new(entries)
    }
}

/// `**Title:** body` and `**Title**: body` split into title and body.
fn bullet_entry(item: &str) -> BlockEntry {
    if let Some(caps) = BOLD_LEAD_RE.captures(item) {
        let bold = caps[1].trim();
        let rest = caps[2].trim_start();
        let split = if let Some(title) = bold.strip_suffix(':') {
            Some((title.trim(), rest))
        } else {
            rest.strip_prefix(':').map(|body| (bold, body.trim_start()))
        };
        if let Some((title, body)) = split.filter(|(t, _)| !t.is_empty()) {
            return BlockEntry::bullet(Some(title.to_string()), parse_inline(body.trim()));
        }
    }
    BlockEntry::bullet(None, parse_inline(item))
}

fn parse_summary(span: &str) -> StructuredBlock {
    let paragraphs: Vec<BlockEntry> = BLANK_LINE_RE
        .split(span)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| BlockEntry::paragraph(parse_lines(p)))
        .collect();

    if paragraphs.is_empty() {
        placeholder_paragraph()
    } else {
        StructuredBlock::new(paragraphs)
    }
}

/// Lines of one paragraph; single newlines become soft breaks.
fn parse_lines(paragraph: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    for (i, line) in paragraph.lines().map(str::trim).enumerate() {
        if i > 0 {
            spans.push(Inline::SoftBreak);
        }
        spans.extend(parse_inline(line));
    }
    spans
}

/// `**x**` becomes strong emphasis; everything else is text.
fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in STRONG_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Inline::Text(text[last..whole.start()].to_string()));
        }
        spans.push(Inline::Strong(inner.as_str().to_string()));
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Inline::Text(text[last..].to_string()));
    }
    spans
}

/// Strip every markup token: bold, underline-bold, emphasis, HTML tags and
/// heading markers. Paragraph breaks are kept.
pub fn plain_text(markup: &str) -> String {
    let text = STRONG_RE.replace_all(markup, "$1");
    let text = UNDERLINE_STRONG_RE.replace_all(&text, "$1");
    let text = EMPHASIS_RE.replace_all(&text, "$1");
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = HEADING_RE.replace_all(&text, "");
    let text = text.replace("**", "").replace("__", "");

    let plain = BLANK_LINE_RE
        .split(&text)
        .map(|p| {
            p.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if plain.is_empty() {
        EMPTY_SUMMARY.to_string()
    } else {
        plain
    }
}

fn placeholder_bullet(text: &str) -> StructuredBlock {
    StructuredBlock::new(vec![BlockEntry::bullet(None, vec![Inline::Text(text.to_string())])])
}

fn placeholder_paragraph() -> StructuredBlock {
    StructuredBlock::new(vec![BlockEntry::paragraph(vec![Inline::Text(
        EMPTY_SUMMARY.to_string(),
    )])])
}
