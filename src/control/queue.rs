//! Play-next queue management

use std::collections::VecDeque;

use crate::types::AudioItem;

/// Ordered list of items waiting for an explicit `play_next`
///
/// FIFO: items are appended at the tail and promoted from the head. The
/// queue never advances by itself when the current item finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackQueue {
    items: VecDeque<AudioItem>,
}

impl PlaybackQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the end of the queue
    ///
    /// Returns `false` and leaves the queue untouched when an item with the
    /// same id is already queued.
    pub fn enqueue(&mut self, item: AudioItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// Remove the first item with `id`
    pub fn dequeue(&mut self, id: &str) -> Option<AudioItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.items.remove(index)
    }

    /// Remove and return the head of the queue
    pub fn pop_next(&mut self) -> Option<AudioItem> {
        self.items.pop_front()
    }

    /// Clear the queue
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Head of the queue without removing it
    #[must_use]
    pub fn peek(&self) -> Option<&AudioItem> {
        self.items.front()
    }

    /// Check whether an id is queued
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Get queue length
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in play order
    pub fn items(&self) -> impl Iterator<Item = &AudioItem> {
        self.items.iter()
    }

    /// Ids in play order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}
