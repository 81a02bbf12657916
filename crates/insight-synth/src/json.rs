//! Lenient JSON field extraction for model replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*\s*\n?(.*?)\n?\s*```\s*$").unwrap());

/// Remove a surrounding Markdown code fence, if any.
pub fn strip_code_fences(text: &str) -> &str {
    match FENCE_RE.captures(text) {
        Some(c) => c.get(1).map_or(text, |m| m.as_str()),
        None => text,
    }
}

/// Parse a JSON object: the whole (fence-stripped) reply first, then the
/// first `{ ... }` slice inside it that parses.
pub fn parse_object(text: &str) -> Option<Map<String, Value>> {
    let text = strip_code_fences(text).trim();
    if let Ok(Value::Object(map)) = serde_json::from_str(text) {
        return Some(map);
    }

    let last = text.rfind('}')?;
    text.match_indices('{')
        .map(|(i, _)| i)
        .filter(|&i| i < last)
        .find_map(|i| match serde_json::from_str(&text[i..=last]) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}

/// Extract a string field: structured parse, then a regex over the raw text.
pub fn string_field(text: &str, field: &str) -> Option<String> {
    let from_json = parse_object(text)
        .and_then(|map| map.get(field).and_then(Value::as_str).map(str::to_string));
    if from_json.is_some() {
        return from_json;
    }

    let pattern = format!(r#""{}"\s*:\s*"([^"]+)""#, regex::escape(field));
    Regex::new(&pattern)
        .ok()?
        .captures(text)
        .map(|c| c[1].to_string())
}
