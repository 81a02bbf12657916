//! Prompt templates. Each prompt carries a fixed lead phrase so replies and
//! logs can be told apart.

use insight_core::{AudienceProfile, Category, ContentType, TextSegment};

use crate::engine::SourceContext;

const PERSONA: &str =
    "You are an expert document summarizer for a professional audience of product managers.";

const FORMAT_INSTRUCTIONS: &str = "\
Format your response with two clearly separated sections in this exact order:

1. Key Points: A bulleted list of exactly 4-5 key points from the document
2. Summary: A concise summary of no more than 2 short paragraphs (100-150 words total)

Use these exact section headers: 'Key Points:' and 'Summary:'

For Key Points:
- Start each point with a bullet point (- )
- Put a clear title in **bold** at the beginning of each point
- Keep each point focused on a key fact or insight from the document
- Make points brief and direct - one sentence per point is ideal

Example format for a key point:
- **Market Growth:** Customer satisfaction increased 24% over the last quarter.

Focus on highlighting factual information from the document rather than making recommendations. \
The summary should be objective and concise, capturing the most important information.";

fn source_noun(content_type: Option<ContentType>) -> &'static str {
    match content_type {
        Some(ContentType::Pdf) | None => "document",
        Some(ContentType::Weblink) => "web page content",
        Some(ContentType::Video) => "video transcript",
    }
}

fn framing(ctx: &SourceContext<'_>) -> String {
    let mut framing = String::from(PERSONA);
    match ctx.content_type {
        Some(ContentType::Video) => framing.push_str(" You're analyzing a transcript from a YouTube video."),
        Some(ContentType::Weblink) => framing.push_str(" You're analyzing content from a web page."),
        _ => {}
    }
    if let Some(title) = ctx.title.filter(|t| !t.trim().is_empty()) {
        framing.push_str(&format!(" The title is \"{}\".", title.trim()));
    }
    framing
}

/// Single-call summary of a bounded prefix.
pub fn direct(text: &str, ctx: &SourceContext<'_>) -> String {
    format!(
        "{}\n\n{}\n\nSummarize this {} and extract key insights:\n\n{}",
        framing(ctx),
        FORMAT_INSTRUCTIONS,
        source_noun(ctx.content_type),
        text
    )
}

/// Map step: facts from one segment.
pub fn extract(segment: &TextSegment, total: usize, ctx: &SourceContext<'_>) -> String {
    format!(
        "{}\n\nExtract the key facts from part {} of {} of this {}. \
         Respond only with a bulleted list (- ) of concrete facts, figures, names and findings. \
         Do not write a summary or any section headers.\n\n{}",
        framing(ctx),
        segment.index + 1,
        total,
        source_noun(ctx.content_type),
        segment.text
    )
}

/// Reduce step: one digest from all extracted notes.
pub fn reduce(notes: &str, parts: usize, ctx: &SourceContext<'_>) -> String {
    format!(
        "{}\n\n{}\n\nCombine these notes, extracted from {} parts of a long {}, \
         into a single set of key points and summary:\n\n{}",
        framing(ctx),
        FORMAT_INSTRUCTIONS,
        parts,
        source_noun(ctx.content_type),
        notes
    )
}

pub fn classify(sample: &str, title: Option<&str>) -> String {
    let names = Category::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let title_line = title
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("Title: {}\n", t.trim()))
        .unwrap_or_default();
    format!(
        "Classify this document into exactly one of these categories: {}.\n\
         Respond with a JSON object in this format: {{\"category\": \"<one of the categories>\"}}\n\n\
         {}Text:\n{}",
        names, title_line, sample
    )
}

/// Inputs for one audience's relevance prompt.
pub struct RelevancePrompt<'a> {
    pub title: &'a str,
    pub category: Category,
    pub summary: &'a str,
    pub key_points: &'a str,
    pub excerpt: &'a str,
    pub audience: &'a AudienceProfile,
}

pub fn relevance(p: &RelevancePrompt<'_>) -> String {
    format!(
        "You create ultra-concise, hyper-specific document recommendations grounded in concrete \
         document content. You respond in JSON format.\n\n\
         Document Information:\n\
         Title: {title}\n\
         Category: {category}\n\
         Summary: {summary}\n\
         Key Points: {key_points}\n\
         Text excerpt: {excerpt}\n\n\
         Team specialization: {team}\n\
         Team context: {context}\n\n\
         Explain in 1-2 sentences why this document matters specifically to the {team} team. \
         Include exact numbers, specific tools or methods from the document, and the direct \
         benefit to the team's work. Write in second person with active verbs. Avoid vague \
         phrases such as \"enhance capabilities\" or \"optimize operations\".\n\n\
         Respond with a JSON object in this format:\n\
         {{\"relevance_reason\": \"your explanation here\"}}",
        title = p.title,
        category = p.category,
        summary = p.summary,
        key_points = p.key_points,
        excerpt = p.excerpt,
        team = p.audience.id,
        context = p.audience.context_description,
    )
}

pub fn friendly_title(title: &str) -> String {
    format!(
        "You are an expert at creating concise, descriptive document titles. \
         Given a file name, create a professional, clear document title that would make sense \
         in a document library for product managers. Keep it under 6 words if possible. \
         Don't use phrases like 'Report on' or 'Analysis of' unless necessary. \
         Don't include dates unless they seem important to the content. \
         Reply with the title only.\n\nFile name: {}",
        title
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(index: usize) -> TextSegment {
        TextSegment {
            index,
            start: 0,
            end: 4,
            text: "body".into(),
        }
    }

    #[test]
    fn test_extract_names_part_one_based() {
        let ctx = SourceContext::default();
        let prompt = extract(&segment(2), 5, &ctx);
        assert!(prompt.contains("part 3 of 5"));
        assert!(prompt.ends_with("body"));
    }

    #[test]
    fn test_framing_by_content_type() {
        let ctx = SourceContext {
            content_type: Some(ContentType::Video),
            title: Some("Roadmap Talk"),
        };
        let prompt = direct("text", &ctx);
        assert!(prompt.contains("YouTube video"));
        assert!(prompt.contains("\"Roadmap Talk\""));
        assert!(prompt.contains("Summarize this video transcript"));
        assert!(prompt.contains("'Key Points:' and 'Summary:'"));
    }

    #[test]
    fn test_classify_lists_every_category() {
        let prompt = classify("sample", None);
        for c in Category::ALL {
            assert!(prompt.contains(c.name()));
        }
        assert!(!prompt.contains("Title:"));
    }
}
