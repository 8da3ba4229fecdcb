//! Splits text into matched and unmatched segments for display.

use regex::RegexBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Splits `text` around case-insensitive occurrences of `query`.
///
/// A blank query yields the whole text as one unmatched segment. Empty text
/// yields no segments.
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let query = query.trim();
    let whole = || {
        vec![Segment {
            text: text.to_string(),
            matched: false,
        }]
    };
    if query.is_empty() {
        return whole();
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return whole();
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment {
                text: text[cursor..found.start()].to_string(),
                matched: false,
            });
        }
        segments.push(Segment {
            text: found.as_str().to_string(),
            matched: true,
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            matched: false,
        });
    }
    segments
}
