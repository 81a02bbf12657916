//! Text segmentation for chunked synthesis.
//!
//! Splits long text into ordered, overlapping windows. Each window end is
//! pulled back to a paragraph break (or failing that a sentence break) when one
//! exists in the second half of the window. Offsets are bytes and always land
//! on `char` boundaries.

use insight_core::{Error, Result, TextSegment};

/// Paragraph break first, then sentence break.
const BREAKS: [&str; 2] = ["\n\n", ". "];

/// Fixed-window segmenter with overlap and boundary snapping.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter {
    window: usize,
    overlap: usize,
}

impl Segmenter {
    /// Requires `window > overlap`.
    pub fn new(window: usize, overlap: usize) -> Result<Self> {
        if window == 0 || overlap >= window {
            return Err(Error::Config(format!(
                "segment window ({}) must be greater than overlap ({})",
                window, overlap
            )));
        }
        Ok(Self { window, overlap })
    }

    /// Split `text` into segments. Empty text yields no segments.
    pub fn segment(&self, text: &str) -> Vec<TextSegment> {
        let len = text.len();
        let mut segments = Vec::new();
        let mut start = 0;

        while start < len {
            let candidate = floor_char_boundary(text, start.saturating_add(self.window));
            let mut end = if candidate < len {
                self.snap_end(text, start, candidate)
            } else {
                candidate
            };
            if end <= start {
                end = ceil_char_boundary(text, start + 1);
            }

            segments.push(TextSegment {
                index: segments.len(),
                start,
                end,
                text: text[start..end].to_string(),
            });

            if end >= len {
                break;
            }

            let mut next = floor_char_boundary(text, end.saturating_sub(self.overlap));
            if next <= start {
                next = end;
            }
            start = next;
        }

        segments
    }

    /// Move `candidate` back to just after the last break in the second half of the window.
    fn snap_end(&self, text: &str, start: usize, candidate: usize) -> usize {
        let floor = ceil_char_boundary(text, start + self.window / 2);
        if floor >= candidate {
            return candidate;
        }
        let region = &text[floor..candidate];
        for brk in BREAKS {
            if let Some(pos) = region.rfind(brk) {
                return floor + pos + brk.len();
            }
        }
        candidate
    }
}

/// Longest prefix of `text` no longer than `max_bytes`, cut on a char boundary.
pub fn prefix(text: &str, max_bytes: usize) -> &str {
    &text[..floor_char_boundary(text, max_bytes)]
}

fn floor_char_boundary(text: &str, mut i: usize) -> usize {
    if i >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    if i >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lorem(len: usize) -> String {
        let text = "lorem ipsum dolor sit amet ".repeat(len / 27 + 1);
        text[..len].to_string()
    }

    fn assert_covers(text: &str, segments: &[TextSegment]) {
        assert_eq!(segments.first().map(|s| s.start), Some(0));
        assert_eq!(segments.last().map(|s| s.end), Some(text.len()));
        for pair in segments.windows(2) {
            assert!(pair[1].start > pair[0].start, "starts must increase");
            assert!(pair[1].start <= pair[0].end, "gap between segments");
        }
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.index, i);
            assert!(seg.end > seg.start);
            assert_eq!(seg.text, &text[seg.start..seg.end]);
        }
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(Segmenter::new(0, 0).is_err());
        assert!(Segmenter::new(100, 100).is_err());
        assert!(Segmenter::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_text() {
        let seg = Segmenter::new(10, 2).unwrap();
        assert!(seg.segment("").is_empty());
    }

    #[test]
    fn test_short_text_single_segment() {
        let seg = Segmenter::new(10_000, 500).unwrap();
        let text = "Hello, world!";
        let segments = seg.segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, text);
        assert_eq!((segments[0].start, segments[0].end), (0, text.len()));
    }

    #[test]
    fn test_text_equal_to_window_is_one_segment() {
        let seg = Segmenter::new(100, 10).unwrap();
        let text = lorem(100);
        assert_eq!(seg.segment(&text).len(), 1);
    }

    #[test]
    fn test_forty_five_thousand_chars_yields_five_segments() {
        let seg = Segmenter::new(10_000, 500).unwrap();
        let text = lorem(45_000);
        let segments = seg.segment(&text);
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[4].end, 45_000);
        assert_eq!(segments[1].start, 9_500);
        assert_covers(&text, &segments);
    }

    #[test]
    fn test_snaps_to_paragraph_break() {
        let seg = Segmenter::new(100, 10).unwrap();
        let mut text = "a".repeat(70);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(100));
        let segments = seg.segment(&text);
        assert_eq!(segments[0].end, 72);
        assert!(segments[0].text.ends_with("\n\n"));
        assert_covers(&text, &segments);
    }

    #[test]
    fn test_prefers_paragraph_over_later_sentence() {
        let seg = Segmenter::new(100, 10).unwrap();
        let mut text = "a".repeat(60);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(20));
        text.push_str(". ");
        text.push_str(&"c".repeat(100));
        let segments = seg.segment(&text);
        assert_eq!(segments[0].end, 62);
    }

    #[test]
    fn test_snaps_to_sentence_break() {
        let seg = Segmenter::new(100, 10).unwrap();
        let mut text = "a".repeat(80);
        text.push_str(". ");
        text.push_str(&"b".repeat(100));
        let segments = seg.segment(&text);
        assert_eq!(segments[0].end, 82);
        assert_covers(&text, &segments);
    }

    #[test]
    fn test_ignores_break_in_first_half() {
        let seg = Segmenter::new(100, 10).unwrap();
        let mut text = "a".repeat(20);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(200));
        let segments = seg.segment(&text);
        assert_eq!(segments[0].end, 100);
    }

    #[test]
    fn test_multibyte_text_stays_on_char_boundaries() {
        let seg = Segmenter::new(7, 2).unwrap();
        let text = "héllo wörld ünïcode ñ ".repeat(10);
        let segments = seg.segment(&text);
        assert_covers(&text, &segments);
    }

    #[test]
    fn test_window_smaller_than_a_char_still_progresses() {
        let seg = Segmenter::new(1, 0).unwrap();
        let text = "日本語";
        let segments = seg.segment(text);
        assert_eq!(segments.len(), 3);
        assert_covers(text, &segments);
    }

    #[test]
    fn test_coverage_across_parameters() {
        let mut text = String::new();
        for i in 0..200 {
            text.push_str(&format!("Sentence number {} is here. ", i));
            if i % 7 == 0 {
                text.push_str("\n\n");
            }
        }
        for (window, overlap) in [(50, 0), (64, 63), (100, 30), (1_000, 500), (333, 1)] {
            let segments = Segmenter::new(window, overlap).unwrap().segment(&text);
            assert_covers(&text, &segments);
            assert!(segments.iter().all(|s| s.end - s.start <= window));
        }
    }

    #[test]
    fn test_prefix_respects_char_boundary() {
        assert_eq!(prefix("héllo", 2), "h");
        assert_eq!(prefix("héllo", 3), "hé");
        assert_eq!(prefix("abc", 10), "abc");
    }
}
