//! Kind and text filters.

use crate::model::item::{Item, ItemType};

/// View filter: optional kind (`None` = everything) plus free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub kind: Option<ItemType>,
    pub query: String,
}

impl ItemFilter {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn of_kind(kind: ItemType) -> Self {
        Self {
            kind: Some(kind),
            query: String::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Whether `item` passes both the kind and the text filter.
    ///
    /// The text filter looks at `content`, `original_input` and tag labels.
    pub fn matches(&self, item: &Item) -> bool {
        if self.kind.is_some_and(|kind| kind != item.kind) {
            return false;
        }
        if !self.has_query() {
            return true;
        }

        let needle = self.query.trim().to_lowercase();
        item.content.to_lowercase().contains(&needle)
            || item.original_input.to_lowercase().contains(&needle)
            || item
                .tags
                .iter()
                .any(|tag| tag.label.to_lowercase().contains(&needle))
    }

    /// Items passing the filter, in input order.
    pub fn apply(&self, items: &[Item]) -> Vec<Item> {
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }
}
