//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical record produced by classification.
//! - Provide mutation helpers that keep `updated` in step with every edit.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `created <= updated`.
//! - `has_time == true` implies `due_date.is_some()`.
//! - `original_input` and `created` never change after construction.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::tag::Tag;

/// Opaque unique identifier for an item.
///
/// Generated values are UUIDv4 strings, but any non-empty string read back
/// from storage is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts an existing identifier, rejecting blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Something anchored to a date/time (meeting, appointment, call).
    Event,
    /// Actionable, completable unit.
    Task,
    /// Anything else.
    Note,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Task => "task",
            Self::Note => "note",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "event" => Some(Self::Event),
            "task" => Some(Self::Task),
            "note" => Some(Self::Note),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    Weekly,
}

impl Recurrence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

/// Validation failures for item invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// `has_time` is set but there is no due date to carry the time.
    TimeWithoutDueDate,
    /// `updated` is earlier than `created`.
    UpdatedBeforeCreated {
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeWithoutDueDate => write!(f, "has_time requires a due_date"),
            Self::UpdatedBeforeCreated { created, updated } => write!(
                f,
                "updated ({}) must be >= created ({})",
                updated.to_rfc3339(),
                created.to_rfc3339()
            ),
        }
    }
}

impl Error for ItemValidationError {}

/// Canonical classified item.
///
/// Serialized with camelCase keys and `type` for the kind, which is the shape
/// kept in the item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub kind: ItemType,
    pub title: String,
    pub content: String,
    /// Verbatim text that produced this item.
    pub original_input: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// `None` means unscheduled, which is not the same as "now".
    pub due_date: Option<DateTime<Utc>>,
    /// Whether `due_date` carries a meaningful time of day.
    #[serde(default)]
    pub has_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Only meaningful for tasks, present on all items.
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Creates an unscheduled, untagged item with a generated ID.
    ///
    /// `created` and `updated` are both set to `now`, truncated to milliseconds.
    pub fn new(
        kind: ItemType,
        title: impl Into<String>,
        content: impl Into<String>,
        original_input: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let now = truncate_millis(now);
        Self {
            id: ItemId::generate(),
            kind,
            title: title.into(),
            content: content.into(),
            original_input: original_input.into(),
            tags: Vec::new(),
            due_date: None,
            has_time: false,
            priority: None,
            recurrence: None,
            created: now,
            updated: now,
            completed: false,
        }
    }

    /// Checks item invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.has_time && self.due_date.is_none() {
            return Err(ItemValidationError::TimeWithoutDueDate);
        }
        if self.updated < self.created {
            return Err(ItemValidationError::UpdatedBeforeCreated {
                created: self.created,
                updated: self.updated,
            });
        }
        Ok(())
    }

    pub fn is_scheduled(&self) -> bool {
        self.due_date.is_some()
    }

    /// Refreshes `updated`, never moving it before `created`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated = truncate_millis(now).max(self.created);
    }

    /// Replaces the content. Returns `false` without touching when unchanged.
    pub fn set_content(&mut self, content: &str, now: DateTime<Utc>) -> bool {
        let trimmed = content.trim();
        if trimmed == self.content {
            return false;
        }
        self.content = trimmed.to_string();
        self.touch(now);
        true
    }

    /// Sets or clears the due date. Clearing it also clears `has_time`.
    pub fn set_due_date(&mut self, due: Option<DateTime<Utc>>, has_time: bool, now: DateTime<Utc>) {
        self.has_time = has_time && due.is_some();
        self.due_date = due.map(truncate_millis);
        self.touch(now);
    }

    pub fn set_tags(&mut self, tags: Vec<Tag>, now: DateTime<Utc>) {
        self.tags = tags;
        self.touch(now);
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) -> bool {
        self.completed = !self.completed;
        self.touch(now);
        self.completed
    }

    /// Human-readable due date in `tz`, respecting `has_time`.
    pub fn due_label<Tz>(&self, tz: &Tz) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.due_date
            .map(|due| format_due_date(&due.with_timezone(tz), self.kind, self.has_time))
    }
}

/// Formats a due date: `Jan 5, 2025 3:00 PM` for timed events, otherwise
/// `Jan 5, 2025`.
pub fn format_due_date<Tz>(due: &DateTime<Tz>, kind: ItemType, has_time: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if kind == ItemType::Event && has_time {
        due.format("%b %-d, %Y %-I:%M %p").to_string()
    } else {
        due.format("%b %-d, %Y").to_string()
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview_title(text: &str, max_chars: usize) -> String {
    let mut title = text.chars().take(max_chars).collect::<String>();
    if text.chars().count() > max_chars {
        title.push_str("...");
    }
    title
}

/// Current time at the precision kept by the store.
pub fn now_millis() -> DateTime<Utc> {
    truncate_millis(Utc::now())
}

pub fn truncate_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::{format_due_date, preview_title, Item, ItemId, ItemType};
    use chrono::{TimeZone, Utc};

    #[test]
    fn item_id_parse_rejects_blank() {
        assert!(ItemId::parse("   ").is_none());
        assert_eq!(ItemId::parse(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn item_type_parse_is_case_insensitive() {
        assert_eq!(ItemType::parse("EVENT"), Some(ItemType::Event));
        assert_eq!(ItemType::parse("reminder"), None);
    }

    #[test]
    fn format_due_date_respects_has_time_for_events_only() {
        let due = Utc.with_ymd_and_hms(2025, 1, 5, 15, 0, 0).unwrap();
        assert_eq!(format_due_date(&due, ItemType::Event, true), "Jan 5, 2025 3:00 PM");
        assert_eq!(format_due_date(&due, ItemType::Event, false), "Jan 5, 2025");
        assert_eq!(format_due_date(&due, ItemType::Task, true), "Jan 5, 2025");
    }

    #[test]
    fn preview_title_appends_ellipsis_only_when_cut() {
        assert_eq!(preview_title("short", 50), "short");
        assert_eq!(preview_title(&"x".repeat(51), 50), format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn new_truncates_timestamps_to_millis() {
        let now = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let item = Item::new(ItemType::Note, "t", "c", "c", now);
        assert_eq!(item.created.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(item.created, item.updated);
    }
}
