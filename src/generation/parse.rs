//! Parsing of structured items out of free-form model output.

use serde::de::DeserializeOwned;

/// Extract a JSON array of `T` from a model response.
///
/// Models tend to wrap JSON in prose or code fences, so the outermost `[...]`
/// is located first. Returns `None` when no array of `T` can be read.
pub fn parse_items<T: DeserializeOwned>(response: &str) -> Option<Vec<T>> {
    let json_start = response.find('[');
    let json_end = response.rfind(']');

    let json_str = match (json_start, json_end) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return None,
    };

    serde_json::from_str(json_str).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{Flashcard, QuizItem};

    #[test]
    fn test_parse_with_markdown() {
        let response = r#"Here are your flashcards:

```json
[
    {"question": "What is osmosis?", "answer": "Diffusion of water across a membrane."}
]
```

Good luck!"#;

        let cards: Vec<Flashcard> = parse_items(response).unwrap();
        assert_eq!(cards.len(), 1);
        assert!(matches!(&cards[0], Flashcard::Structured { question, .. } if question == "What is osmosis?"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_items::<QuizItem>("no json here").is_none());
        assert!(parse_items::<QuizItem>("] backwards [").is_none());
        assert!(parse_items::<QuizItem>("[not, valid]").is_none());
    }
}
