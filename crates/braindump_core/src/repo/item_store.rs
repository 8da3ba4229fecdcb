//! Item collection persistence over a key/value store.
//!
//! # Responsibility
//! - Serialize the full item sequence under one key.
//! - Decode persisted data defensively, record by record.
//!
//! # Invariants
//! - `load` returns an empty sequence when nothing is stored or the payload is
//!   unreadable.
//! - A malformed record is dropped without affecting its neighbours.
//! - Missing or invalid `created`/`updated` values are coerced to load time.
//! - Decoded items always satisfy `Item::validate()` and have unique IDs.

use crate::model::item::{
    now_millis, preview_title, truncate_millis, Item, ItemId, ItemType, Priority, Recurrence,
};
use crate::model::tag::Tag;
use crate::repo::kv_store::{KeyValueStore, StoreError, StoreResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use log::{error, info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Storage key holding the serialized item sequence.
pub const ITEMS_KEY: &str = "braindump_items";

const TITLE_PREVIEW_CHARS: usize = 50;
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Outcome of decoding a persisted item payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedItems {
    pub items: Vec<Item>,
    /// Records dropped as malformed or duplicate.
    pub rejected: usize,
}

/// Load/save facade for the item sequence.
pub struct ItemStore<S> {
    kv: S,
}

impl<S: KeyValueStore> ItemStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Loads all items, coercing missing timestamps to the current time.
    pub fn load(&self) -> Vec<Item> {
        self.load_at(now_millis())
    }

    /// Loads all items, coercing missing timestamps to `now`.
    ///
    /// Never fails: storage or payload errors are logged and yield `[]`.
    pub fn load_at(&self, now: DateTime<Utc>) -> Vec<Item> {
        match self.try_load_at(now) {
            Ok(decoded) => {
                if decoded.rejected > 0 {
                    warn!(
                        "event=items_load module=repo status=partial loaded={} rejected={}",
                        decoded.items.len(),
                        decoded.rejected
                    );
                } else {
                    info!(
                        "event=items_load module=repo status=ok loaded={}",
                        decoded.items.len()
                    );
                }
                decoded.items
            }
            Err(err) => {
                error!("event=items_load module=repo status=error error={err}");
                Vec::new()
            }
        }
    }

    /// Fallible load used by `load_at`.
    pub fn try_load_at(&self, now: DateTime<Utc>) -> StoreResult<DecodedItems> {
        match self.kv.get(ITEMS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => decode_items(&raw, now),
            _ => Ok(DecodedItems::default()),
        }
    }

    /// Saves the full item sequence. Failures are logged and swallowed.
    pub fn save(&self, items: &[Item]) {
        match self.try_save(items) {
            Ok(()) => info!(
                "event=items_save module=repo status=ok count={}",
                items.len()
            ),
            Err(err) => error!(
                "event=items_save module=repo status=error count={} error={err}",
                items.len()
            ),
        }
    }

    pub fn try_save(&self, items: &[Item]) -> StoreResult<()> {
        let payload = encode_items(items)?;
        self.kv.set(ITEMS_KEY, &payload)
    }
}

/// Serializes items to the persisted JSON array shape.
pub fn encode_items(items: &[Item]) -> StoreResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Decodes a persisted JSON array, dropping malformed records.
///
/// # Errors
/// - `Codec` when the payload is not JSON at all.
/// - `InvalidData` when the top-level value is not an array.
pub fn decode_items(raw: &str, now: DateTime<Utc>) -> StoreResult<DecodedItems> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(records) = value else {
        return Err(StoreError::InvalidData(
            "expected a JSON array of items".to_string(),
        ));
    };

    let now = truncate_millis(now);
    let mut decoded = DecodedItems::default();
    let mut seen = HashSet::new();

    for record in &records {
        match decode_record(record, now) {
            Some(item) if seen.insert(item.id.clone()) => decoded.items.push(item),
            _ => decoded.rejected += 1,
        }
    }

    Ok(decoded)
}

fn decode_record(record: &Value, now: DateTime<Utc>) -> Option<Item> {
    let fields = record.as_object()?;

    let id = ItemId::parse(fields.get("id")?.as_str()?)?;
    let kind = ItemType::parse(fields.get("type")?.as_str()?)?;
    let content = fields.get("content")?.as_str()?.to_string();

    let title = string_field(fields, "title")
        .unwrap_or_else(|| preview_title(&content, TITLE_PREVIEW_CHARS));
    let original_input = string_field(fields, "originalInput").unwrap_or_else(|| content.clone());
    let due_date = fields.get("dueDate").and_then(parse_timestamp);
    let has_time = bool_field(fields, "hasTime") && due_date.is_some();
    let created = fields
        .get("created")
        .and_then(parse_timestamp)
        .unwrap_or(now);
    let updated = fields
        .get("updated")
        .and_then(parse_timestamp)
        .unwrap_or(now)
        .max(created);

    Some(Item {
        id,
        kind,
        title,
        content,
        original_input,
        tags: fields.get("tags").map(decode_tags).unwrap_or_default(),
        due_date,
        has_time,
        priority: string_field(fields, "priority").and_then(|value| Priority::parse(&value)),
        recurrence: string_field(fields, "recurrence")
            .and_then(|value| Recurrence::parse(&value)),
        created,
        updated,
        completed: bool_field(fields, "completed"),
    })
}

pub(crate) fn decode_tags(value: &Value) -> Vec<Tag> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let fields = entry.as_object()?;
            let label = fields.get("label")?.as_str()?.trim();
            if label.is_empty() {
                return None;
            }
            let color = fields.get("color")?.as_str()?;
            Some(Tag::new(label, color))
        })
        .collect()
}

/// Accepts epoch-millisecond numbers and ISO-8601 strings.
///
/// Strings may be RFC 3339, a date-time without offset, or a bare
/// `YYYY-MM-DD` date. Offset-less forms are read as UTC.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let parsed = match value {
        Value::String(text) => parse_timestamp_text(text.trim()),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    parsed.map(truncate_millis)
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, NAIVE_DATETIME_FORMAT) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{decode_items, parse_timestamp};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn non_array_payload_is_invalid() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let err = decode_items(r#"{"id":"a"}"#, now).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn epoch_millis_timestamps_are_accepted() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let raw = r#"[{"id":"a","type":"task","content":"x","created":1700000000123,"updated":1700000000456}]"#;
        let decoded = decode_items(raw, now).unwrap();
        assert_eq!(decoded.items[0].created.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(decoded.items[0].updated.timestamp_millis(), 1_700_000_000_456);
    }

    #[test]
    fn iso_strings_without_offset_are_read_as_utc() {
        assert_eq!(
            parse_timestamp(&json!("2025-01-25T15:00:00")),
            Some(Utc.with_ymd_and_hms(2025, 1, 25, 15, 0, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp(&json!("2025-01-25T15:00:00.250")).map(|value| value.timestamp_millis()),
            Some(Utc.with_ymd_and_hms(2025, 1, 25, 15, 0, 0).unwrap().timestamp_millis() + 250)
        );
    }

    #[test]
    fn date_only_strings_are_utc_midnight() {
        assert_eq!(
            parse_timestamp(&json!(" 2025-01-31 ")),
            Some(Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn unrecognized_timestamp_text_is_rejected() {
        assert_eq!(parse_timestamp(&json!("next tuesday")), None);
        assert_eq!(parse_timestamp(&json!("2025-02-30")), None);
        assert_eq!(parse_timestamp(&json!(true)), None);
    }
}
