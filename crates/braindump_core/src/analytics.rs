//! Local usage analytics.
//!
//! # Responsibility
//! - Record coarse, content-free usage events in the key/value store.
//!
//! # Invariants
//! - Events never carry item text, only kind and shape flags.
//! - At most `MAX_EVENTS` events are kept; oldest are dropped first.
//! - Recording never fails from the caller's perspective.

use crate::model::item::{Item, ItemType};
use crate::repo::kv_store::{KeyValueStore, StoreResult};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

pub const ANALYTICS_KEY: &str = "braindump_analytics";
pub const MAX_EVENTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    ItemCreated,
    ItemCompleted,
    ItemDeleted,
    SearchPerformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_tags: Option<bool>,
}

impl EventMetadata {
    /// Shape flags describing `item`.
    pub fn for_item(item: &Item) -> Self {
        Self {
            item_type: Some(item.kind),
            has_date: Some(item.due_date.is_some()),
            has_tags: Some(!item.tags.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub kind: AnalyticsEventType,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

pub struct Analytics<S> {
    kv: S,
}

impl<S: KeyValueStore> Analytics<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Appends one event. Failures are logged at debug level and dropped.
    pub fn track(
        &self,
        kind: AnalyticsEventType,
        metadata: Option<EventMetadata>,
        now: DateTime<Utc>,
    ) {
        let event = AnalyticsEvent {
            kind,
            timestamp: now.timestamp_millis(),
            metadata,
        };
        if let Err(err) = self.try_track(event) {
            debug!("event=analytics_track module=analytics status=error error={err}");
        }
    }

    /// Stored events, oldest first. Unreadable history reads as empty.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.read_events().unwrap_or_default()
    }

    fn try_track(&self, event: AnalyticsEvent) -> StoreResult<()> {
        let mut events = self.read_events().unwrap_or_default();
        events.push(event);
        if events.len() > MAX_EVENTS {
            let overflow = events.len() - MAX_EVENTS;
            events.drain(..overflow);
        }
        self.kv.set(ANALYTICS_KEY, &serde_json::to_string(&events)?)
    }

    fn read_events(&self) -> StoreResult<Vec<AnalyticsEvent>> {
        match self.kv.get(ANALYTICS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}
