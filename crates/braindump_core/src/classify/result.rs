//! Classification results and model response parsing.
//!
//! # Invariants
//! - A result always carries a complete `ClassifiedItem`; callers never see a
//!   partially populated item.
//! - `original_input` is the caller's untouched text, never the sanitized one.
//! - `has_time` is only `true` when `due_date` is present.

use super::error::ClassifyError;
use crate::model::item::{preview_title, Item, ItemType, Priority, Recurrence};
use crate::model::tag::Tag;
use crate::repo::item_store::{decode_tags, parse_timestamp};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FALLBACK_TITLE_CHARS: usize = 50;
const TOO_LONG_TITLE: &str = "Input Too Long";

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*(.*?)\s*```$").expect("valid code fence regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStatus {
    Success,
    Error,
}

/// Proto-item produced by classification, before identity and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedItem {
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub title: String,
    pub content: String,
    pub original_input: String,
    pub tags: Vec<Tag>,
    pub due_date: Option<DateTime<Utc>>,
    pub has_time: bool,
    pub priority: Option<Priority>,
    pub recurrence: Option<Recurrence>,
}

impl ClassifiedItem {
    /// Safe stand-in used whenever classification fails.
    pub fn fallback(input: &str) -> Self {
        Self {
            kind: ItemType::Note,
            title: preview_title(input, FALLBACK_TITLE_CHARS),
            content: input.to_string(),
            original_input: input.to_string(),
            tags: Vec::new(),
            due_date: None,
            has_time: false,
            priority: None,
            recurrence: None,
        }
    }

    /// Stand-in for inputs over the length ceiling; content is cut and
    /// suffixed with `...`.
    pub fn too_long(input: &str, max_chars: usize) -> Self {
        let truncated = input.chars().take(max_chars).collect::<String>();
        Self {
            title: TOO_LONG_TITLE.to_string(),
            content: format!("{truncated}..."),
            ..Self::fallback(input)
        }
    }

    /// Wraps the proto-item into a durable item with a fresh identity.
    pub fn into_item(self, now: DateTime<Utc>) -> Item {
        let mut item = Item::new(
            self.kind,
            self.title,
            self.content,
            self.original_input,
            now,
        );
        item.tags = self.tags;
        item.has_time = self.has_time && self.due_date.is_some();
        item.due_date = self.due_date;
        item.priority = self.priority;
        item.recurrence = self.recurrence;
        item
    }
}

/// Outcome of one classification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub status: ClassificationStatus,
    pub item: ClassifiedItem,
    /// Human-readable message; always present on `Error`.
    pub message: Option<String>,
    /// Failure class for `Error` results.
    pub failure: Option<ClassifyError>,
}

impl ClassificationResult {
    pub fn success(item: ClassifiedItem, message: Option<String>) -> Self {
        Self {
            status: ClassificationStatus::Success,
            item,
            message,
            failure: None,
        }
    }

    pub fn failure(item: ClassifiedItem, error: ClassifyError) -> Self {
        Self {
            status: ClassificationStatus::Error,
            item,
            message: Some(error.to_string()),
            failure: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ClassificationStatus::Success
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNote {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    content: Option<String>,
    tags: Option<Value>,
    due_date: Option<Value>,
    has_time: Option<bool>,
    priority: Option<String>,
    recurrence: Option<String>,
}

/// Parses the model's message content into a classified item.
///
/// Accepts either `{"mainNote": {...}, "message": ...}` or the bare note
/// object, optionally wrapped in a markdown code fence. Returns the item and
/// any top-level `message` the model attached.
///
/// # Errors
/// - `Parse` when the content is not JSON, or `type`/`content` are missing or
///   invalid.
pub fn parse_completion(
    content: &str,
    original_input: &str,
) -> Result<(ClassifiedItem, Option<String>), ClassifyError> {
    let trimmed = content.trim();
    let body = CODE_FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str());

    let value: Value = serde_json::from_str(body)
        .map_err(|err| ClassifyError::Parse(format!("response is not JSON: {err}")))?;
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let note_value = if value.get("mainNote").is_some() {
        value["mainNote"].clone()
    } else {
        value
    };
    let note: WireNote = serde_json::from_value(note_value)
        .map_err(|err| ClassifyError::Parse(format!("unexpected note shape: {err}")))?;

    let kind = note
        .kind
        .as_deref()
        .and_then(ItemType::parse)
        .ok_or_else(|| ClassifyError::Parse("missing or invalid `type`".to_string()))?;
    let body_text = note
        .content
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ClassifyError::Parse("missing `content`".to_string()))?;

    let title = note
        .title
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| preview_title(&body_text, FALLBACK_TITLE_CHARS));
    let due_date = note.due_date.as_ref().and_then(parse_timestamp);

    let item = ClassifiedItem {
        kind,
        title,
        content: body_text,
        original_input: original_input.to_string(),
        tags: note.tags.as_ref().map(decode_tags).unwrap_or_default(),
        has_time: note.has_time.unwrap_or(false) && due_date.is_some(),
        due_date,
        priority: note.priority.as_deref().and_then(Priority::parse),
        recurrence: note.recurrence.as_deref().and_then(Recurrence::parse),
    };
    Ok((item, message))
}
