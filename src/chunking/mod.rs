//! Transcript segmentation.
//!
//! Splits arbitrary-length text into bounded-size segments that each fit a single
//! provider call. The same primitive is used twice per job: once over the transcript
//! and once over the concatenated per-segment summaries during reduction.

use crate::error::{LectioError, Result};
use serde::{Deserialize, Serialize};

/// Rough character-per-token ratio used to turn token budgets into character budgets.
pub const CHARS_PER_TOKEN: usize = 4;

/// A sentence break only counts if it lies past this fraction of the window.
const BOUNDARY_MIN_FRACTION: (usize, usize) = (6, 10);

/// Maximum segment size, in characters or in estimated provider tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "unit", content = "size")]
pub enum SizeBudget {
    Chars(usize),
    Tokens(usize),
}

impl SizeBudget {
    /// The budget expressed in characters.
    pub fn max_chars(&self) -> usize {
        match *self {
            SizeBudget::Chars(n) => n,
            SizeBudget::Tokens(n) => n.saturating_mul(CHARS_PER_TOKEN),
        }
    }
}

/// Estimate the provider token count of a text.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// An ordered, 0-indexed slice of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of this segment in the source.
    pub index: usize,
    /// Trimmed text content.
    pub text: String,
}

impl Segment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Size of this segment in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `text` into segments of at most `budget` characters.
///
/// Each window of `budget` characters is cut after the last period followed by
/// whitespace, provided that break lies past 60% of the window; otherwise the
/// window is cut at its hard boundary. The final window is never cut early.
/// Segments are trimmed, and blank segments are dropped.
pub fn segment(text: &str, budget: SizeBudget) -> Result<Vec<Segment>> {
    let max = budget.max_chars();
    if max == 0 {
        return Err(LectioError::InvalidInput(
            "segment size budget must be greater than zero".to_string(),
        ));
    }

    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        let end = (cursor + max).min(chars.len());
        let window = &chars[cursor..end];

        let mut cut = window.len();
        if end < chars.len() {
            let threshold = window.len() * BOUNDARY_MIN_FRACTION.0 / BOUNDARY_MIN_FRACTION.1;
            if let Some(period) = last_sentence_break(window) {
                if period > threshold {
                    cut = period + 1;
                }
            }
        }

        let piece: String = window[..cut].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            segments.push(Segment::new(segments.len(), trimmed));
        }

        cursor += cut;
    }

    Ok(segments)
}

/// Position of the last `.` that is followed by whitespace inside the window.
fn last_sentence_break(window: &[char]) -> Option<usize> {
    window
        .windows(2)
        .rposition(|pair| pair[0] == '.' && pair[1].is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture_text(total_chars: usize) -> String {
        "alpha beta gamma delta. "
            .chars()
            .cycle()
            .take(total_chars)
            .collect()
    }

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert!(segment("", SizeBudget::Chars(100)).unwrap().is_empty());
        assert!(segment("  \n\t  ", SizeBudget::Chars(100)).unwrap().is_empty());
    }

    #[test]
    fn test_short_input_is_single_trimmed_segment() {
        let segments = segment("  One sentence. Another one.  ", SizeBudget::Chars(100)).unwrap();
        assert_eq!(segments, vec![Segment::new(0, "One sentence. Another one.")]);
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert!(segment("text", SizeBudget::Chars(0)).is_err());
    }

    #[test]
    fn test_cuts_at_sentence_boundary_past_threshold() {
        // Period at index 8 of a 10-char window (past 60%)
        let segments = segment("aaaa bbb. cccccc", SizeBudget::Chars(10)).unwrap();
        assert_eq!(segments[0].text, "aaaa bbb.");
        assert_eq!(segments[1].text, "cccccc");
    }

    #[test]
    fn test_ignores_early_sentence_boundary() {
        // Period at index 2 of a 10-char window is before the 60% mark
        let segments = segment("ab. cdefghijklmno", SizeBudget::Chars(10)).unwrap();
        assert_eq!(segments[0].text, "ab. cdefgh");
        assert_eq!(segments[1].text, "ijklmno");
    }

    #[test]
    fn test_nine_thousand_chars_make_three_segments() {
        let text = lecture_text(9000);
        let segments = segment(&text, SizeBudget::Chars(4000)).unwrap();

        assert_eq!(segments.len(), 3);
        assert!(segments[0].len() > 3900);
        assert!(segments[1].len() > 3900);
        assert!(segments[2].len() < 1100);
        for (i, s) in segments.iter().enumerate() {
            assert_eq!(s.index, i);
            assert!(s.text.ends_with('.') || i == 2);
        }
    }

    #[test]
    fn test_size_bound_and_content_preserved() {
        let texts = [
            lecture_text(2500),
            "no sentence breaks at all just a long run of words ".repeat(40),
            "Ünïcödé sëntence. ".repeat(90),
            "x".repeat(333),
            "Short. ".repeat(3),
        ];

        for text in &texts {
            for max in [1, 2, 7, 10, 64, 100, 999, 5000] {
                let segments = segment(text, SizeBudget::Chars(max)).unwrap();
                assert!(!segments.is_empty());
                for s in &segments {
                    assert!(s.len() <= max, "segment of {} chars exceeds {}", s.len(), max);
                    assert!(!s.text.trim().is_empty());
                }

                let joined = segments
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                assert_eq!(non_whitespace(&joined), non_whitespace(text));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let text = lecture_text(5000);
        let a = segment(&text, SizeBudget::Tokens(300)).unwrap();
        let b = segment(&text, SizeBudget::Tokens(300)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_budget_converts_to_chars() {
        assert_eq!(SizeBudget::Tokens(400).max_chars(), 1600);
        assert_eq!(SizeBudget::Chars(400).max_chars(), 400);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("abcdefghi"), 3);
    }
}
