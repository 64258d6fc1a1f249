//! The play queue: track ids waiting to be played, first in first out.

use super::error::PlayerError;

#[derive(Debug, Default, Clone)]
pub struct PlayQueue {
    items: Vec<String>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.items.push(id.into());
    }

    /// Remove the entry at `index`; negative or out-of-range indices are rejected.
    pub fn remove(&mut self, index: i64) -> Result<String, PlayerError> {
        let len = self.items.len();
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(self.items.remove(i)),
            _ => Err(PlayerError::QueueIndex { index, len }),
        }
    }

    pub fn pop_front(&mut self) -> Option<String> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop every entry referring to `id`; returns how many were removed.
    pub fn retain_without(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i != id);
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
