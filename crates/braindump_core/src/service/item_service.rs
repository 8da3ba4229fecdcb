//! Item use-case service.
//!
//! # Responsibility
//! - Own the in-memory item sequence and persist it after every mutation.
//! - Provide the add/update/delete/complete/edit/reschedule actions.
//! - Produce filtered, organized views.
//!
//! # Invariants
//! - The sequence is newest-first by insertion and IDs are unique.
//! - Mutations never change `id`, `created` or `original_input`.
//! - Every effective mutation bumps `updated`.
//! - Persistence failures are logged and never surface to callers.

use crate::analytics::{Analytics, AnalyticsEventType, EventMetadata};
use crate::model::item::{now_millis, Item, ItemId, ItemValidationError};
use crate::organize::{organize_at, OrganizedItems};
use crate::repo::item_store::ItemStore;
use crate::repo::kv_store::KeyValueStore;
use crate::search::filter::ItemFilter;
use chrono::{DateTime, Local, TimeZone, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ItemServiceResult<T> = Result<T, ItemServiceError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemServiceError {
    NotFound(ItemId),
    DuplicateId(ItemId),
    Validation(ItemValidationError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::DuplicateId(id) => write!(f, "item already exists: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<ItemValidationError> for ItemServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// User action over the item sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Add(Item),
    Update(Item),
    Delete(ItemId),
    ToggleComplete(ItemId),
}

/// Item actions over a key/value store.
///
/// `S` is cloned once so items and analytics share the same backing store;
/// references and `SqliteKvStore` are cheap to clone.
pub struct ItemService<S> {
    store: ItemStore<S>,
    analytics: Analytics<S>,
    items: Vec<Item>,
}

impl<S: KeyValueStore + Clone> ItemService<S> {
    /// Loads the persisted sequence from `kv`.
    pub fn open(kv: S) -> Self {
        Self::open_at(kv, now_millis())
    }

    /// Loads the persisted sequence, coercing missing timestamps to `now`.
    pub fn open_at(kv: S, now: DateTime<Utc>) -> Self {
        let store = ItemStore::new(kv.clone());
        let items = store.load_at(now);
        Self {
            store,
            analytics: Analytics::new(kv),
            items,
        }
    }

    /// Current sequence, newest first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn analytics(&self) -> &Analytics<S> {
        &self.analytics
    }

    /// Prepends a new item.
    ///
    /// # Errors
    /// - `DuplicateId` when an item with the same ID exists.
    /// - `Validation` when the item breaks model invariants.
    pub fn add(&mut self, item: Item) -> ItemServiceResult<()> {
        item.validate()?;
        if self.get(&item.id).is_some() {
            return Err(ItemServiceError::DuplicateId(item.id));
        }

        let metadata = EventMetadata::for_item(&item);
        let created = item.created;
        info!(
            "event=item_add module=service status=ok kind={} scheduled={}",
            item.kind.as_str(),
            item.is_scheduled()
        );
        self.items.insert(0, item);
        self.persist();
        self.analytics
            .track(AnalyticsEventType::ItemCreated, Some(metadata), created);
        Ok(())
    }

    /// Replaces the stored item with the same ID, keeping its identity,
    /// `created` and `original_input`.
    pub fn update(&mut self, item: Item) -> ItemServiceResult<()> {
        self.update_at(item, now_millis())
    }

    pub fn update_at(&mut self, mut item: Item, now: DateTime<Utc>) -> ItemServiceResult<()> {
        let index = self.position(&item.id)?;
        let existing = &self.items[index];
        item.created = existing.created;
        item.original_input = existing.original_input.clone();
        item.has_time = item.has_time && item.due_date.is_some();
        item.touch(now);
        item.validate()?;

        self.items[index] = item;
        self.persist();
        Ok(())
    }

    /// Removes the item and returns it.
    pub fn delete(&mut self, id: &ItemId) -> ItemServiceResult<Item> {
        self.delete_at(id, now_millis())
    }

    pub fn delete_at(&mut self, id: &ItemId, now: DateTime<Utc>) -> ItemServiceResult<Item> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);
        self.persist();
        self.analytics.track(
            AnalyticsEventType::ItemDeleted,
            Some(EventMetadata::for_item(&removed)),
            now,
        );
        Ok(removed)
    }

    /// Flips completion and returns the new state.
    pub fn toggle_complete(&mut self, id: &ItemId) -> ItemServiceResult<bool> {
        self.toggle_complete_at(id, now_millis())
    }

    pub fn toggle_complete_at(&mut self, id: &ItemId, now: DateTime<Utc>) -> ItemServiceResult<bool> {
        let index = self.position(id)?;
        let completed = self.items[index].toggle_completed(now);
        let metadata = EventMetadata::for_item(&self.items[index]);
        self.persist();
        if completed {
            self.analytics
                .track(AnalyticsEventType::ItemCompleted, Some(metadata), now);
        }
        Ok(completed)
    }

    /// Replaces content with its trimmed form. Returns `false` when nothing
    /// changed; the item is then left untouched.
    pub fn edit_content(&mut self, id: &ItemId, content: &str) -> ItemServiceResult<bool> {
        self.edit_content_at(id, content, now_millis())
    }

    pub fn edit_content_at(
        &mut self,
        id: &ItemId,
        content: &str,
        now: DateTime<Utc>,
    ) -> ItemServiceResult<bool> {
        let index = self.position(id)?;
        let changed = self.items[index].set_content(content, now);
        if changed {
            self.persist();
        }
        Ok(changed)
    }

    /// Sets or clears the due date. Clearing also clears `has_time`.
    pub fn set_due_date(
        &mut self,
        id: &ItemId,
        due: Option<DateTime<Utc>>,
        has_time: bool,
    ) -> ItemServiceResult<()> {
        self.set_due_date_at(id, due, has_time, now_millis())
    }

    pub fn set_due_date_at(
        &mut self,
        id: &ItemId,
        due: Option<DateTime<Utc>>,
        has_time: bool,
        now: DateTime<Utc>,
    ) -> ItemServiceResult<()> {
        let index = self.position(id)?;
        self.items[index].set_due_date(due, has_time, now);
        self.persist();
        Ok(())
    }

    /// Dispatches one action.
    pub fn apply(&mut self, action: ItemAction) -> ItemServiceResult<()> {
        match action {
            ItemAction::Add(item) => self.add(item),
            ItemAction::Update(item) => self.update(item),
            ItemAction::Delete(id) => self.delete(&id).map(|_| ()),
            ItemAction::ToggleComplete(id) => self.toggle_complete(&id).map(|_| ()),
        }
    }

    /// Filtered items organized relative to the local day.
    pub fn view(&self, filter: &ItemFilter) -> OrganizedItems {
        self.view_at(filter, &Local::now())
    }

    /// Filtered items organized relative to the day containing `now`.
    ///
    /// A non-blank query is recorded as a search event.
    pub fn view_at<Tz: TimeZone>(&self, filter: &ItemFilter, now: &DateTime<Tz>) -> OrganizedItems {
        if filter.has_query() {
            self.analytics.track(
                AnalyticsEventType::SearchPerformed,
                None,
                now.with_timezone(&Utc),
            );
        }
        organize_at(&filter.apply(&self.items), now)
    }

    fn position(&self, id: &ItemId) -> ItemServiceResult<usize> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| ItemServiceError::NotFound(id.clone()))
    }

    fn persist(&self) {
        self.store.save(&self.items);
    }
}
