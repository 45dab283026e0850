//! Bounded in-memory store of canvas revisions.

use std::collections::VecDeque;

use protocol::HistoryItem;
use uuid::Uuid;

/// Stored revisions, newest first. The oldest entry is evicted once the
/// capacity is reached.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    items: VecDeque<HistoryItem>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// A store with zero capacity accepts nothing.
    pub const fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stores `image` and returns the id it was stored under.
    ///
    /// A known `id` is updated in place and moved to the front. Any other id
    /// (or none) creates a new entry with a fresh id.
    pub fn save(&mut self, id: Option<&str>, image: String, timestamp: i64) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(pos) = id.and_then(|id| self.position(id)) {
            let mut item = self.items.remove(pos)?;
            item.image = image;
            item.timestamp = timestamp;
            let id = item.id.clone();
            self.items.push_front(item);
            return Some(id);
        }

        let id = Uuid::new_v4().to_string();
        while self.items.len() >= self.capacity {
            self.items.pop_back();
        }
        self.items.push_front(HistoryItem {
            id: id.clone(),
            timestamp,
            image,
        });
        Some(id)
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Removes an entry. Returns `false` if the id was unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        self.position(id)
            .and_then(|pos| self.items.remove(pos))
            .is_some()
    }

    /// All entries, newest first.
    pub fn items(&self) -> Vec<HistoryItem> {
        self.items.iter().cloned().collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}
