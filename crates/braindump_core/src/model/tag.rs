//! Tag palette.
//!
//! Labels outside the palette are still valid tags; only the palette colors
//! are advertised to the classifier.

use serde::{Deserialize, Serialize};

/// Fixed label -> hex color mapping, in prompt order.
pub const TAG_PALETTE: &[(&str, &str)] = &[
    ("work", "#3b82f6"),
    ("personal", "#8b5cf6"),
    ("urgent", "#ef4444"),
    ("important", "#f59e0b"),
    ("meeting", "#10b981"),
    ("idea", "#6366f1"),
];

/// Label/color pair attached to an item. Labels need not be unique per item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub color: String,
}

impl Tag {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }

    /// Builds a tag from a palette label, or `None` if the label is unknown.
    pub fn from_palette(label: &str) -> Option<Self> {
        palette_color(label).map(|color| Self::new(label.trim().to_ascii_lowercase(), color))
    }
}

/// Returns the palette color for `label` (case-insensitive).
pub fn palette_color(label: &str) -> Option<&'static str> {
    let normalized = label.trim().to_ascii_lowercase();
    TAG_PALETTE
        .iter()
        .find(|(known, _)| *known == normalized)
        .map(|(_, color)| *color)
}

/// Renders the palette as `label: color` pairs for the classifier instruction.
pub fn palette_prompt_line() -> String {
    TAG_PALETTE
        .iter()
        .map(|(label, color)| format!("{label}: {color}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{palette_color, palette_prompt_line, Tag};

    #[test]
    fn palette_lookup_is_case_insensitive() {
        assert_eq!(palette_color(" Work "), Some("#3b82f6"));
        assert_eq!(palette_color("groceries"), None);
    }

    #[test]
    fn from_palette_normalizes_label() {
        let tag = Tag::from_palette("URGENT").expect("urgent is in the palette");
        assert_eq!(tag, Tag::new("urgent", "#ef4444"));
    }

    #[test]
    fn prompt_line_lists_every_entry() {
        let line = palette_prompt_line();
        assert!(line.starts_with("work: #3b82f6, personal: #8b5cf6"));
        assert!(line.ends_with("idea: #6366f1"));
    }
}
