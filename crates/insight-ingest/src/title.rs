//! Title cleanup for file names and scraped titles.

use once_cell::sync::Lazy;
use regex::Regex;

static EXTENSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^.\s]+$").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").unwrap()
});
static LONG_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{6,}").unwrap());
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Titles longer than this are considered unclear.
const MAX_CLEAR_TITLE: usize = 30;

/// Strip extension, separators and embedded UUIDs from a file name.
pub fn clean_title(filename: &str) -> String {
    let name = EXTENSION_RE.replace(filename.trim(), "");
    let name = UUID_RE.replace_all(&name, "");
    let name = name.replace(['_', '-'], " ");
    SPACES_RE.replace_all(&name, " ").trim().to_string()
}

/// Whether a cleaned title still looks machine-generated.
pub fn looks_machine_generated(title: &str) -> bool {
    title.chars().count() > MAX_CLEAR_TITLE
        || LONG_DIGITS_RE.is_match(title)
        || !title.contains(' ')
}

/// Capitalize the first letter of every word.
pub fn title_case(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("quarterly_sales-report.pdf"), "quarterly sales report");
        assert_eq!(
            clean_title("3f2504e0-4f89-11d3-9a0c-0305e82c3301_market_trends.pdf"),
            "market trends"
        );
    }

    #[test]
    fn test_looks_machine_generated() {
        assert!(looks_machine_generated("scan20240101123"));
        assert!(looks_machine_generated("report 20240101"));
        assert!(looks_machine_generated(
            "a very long title that keeps going and going past the limit"
        ));
        assert!(!looks_machine_generated("market trends"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("market TRENDS  report"), "Market Trends Report");
    }
}
