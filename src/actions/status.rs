//! Status indicator cache.

use std::collections::HashMap;

use serde::Serialize;

use super::StatusUpdate;

/// Current state of one status indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusItem {
    pub id: String,
    pub text: String,
    pub tooltip: Option<String>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub background_color: Option<String>,
    pub visible: bool,
}

impl StatusItem {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

/// Live status indicators keyed by id.
///
/// Entries are created on first use and live until removed explicitly.
#[derive(Debug, Default)]
pub struct StatusIndicatorCache {
    items: HashMap<String, StatusItem>,
}

impl StatusIndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update an indicator and mark it visible.
    ///
    /// Only fields present in `update` are written.
    pub fn apply(&mut self, update: &StatusUpdate) -> StatusItem {
        let item = self
            .items
            .entry(update.id.clone())
            .or_insert_with(|| StatusItem::new(&update.id));

        if let Some(text) = &update.text {
            item.text = text.clone();
        }
        if let Some(tooltip) = &update.tooltip {
            item.tooltip = Some(tooltip.clone());
        }
        if let Some(color) = &update.color {
            item.color = Some(color.clone());
        }
        if let Some(name) = &update.name {
            item.name = Some(name.clone());
        }
        if let Some(background) = &update.background_color {
            item.background_color = Some(background.clone());
        }
        item.visible = true;

        item.clone()
    }

    /// Discard an indicator. Returns `None` when it was not cached.
    pub fn remove(&mut self, id: &str) -> Option<StatusItem> {
        self.items.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&StatusItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
