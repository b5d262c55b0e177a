//! Bounded per-session message cache.
//!
//! Sessions that survive emptiness (`sessionNeedsClientsToLive = false`)
//! record every relayed payload so late joiners can replay what they missed.
//! The cache is a capped FIFO; overflow drops the oldest entry.

use std::collections::VecDeque;

use serde_json::Value;

/// Ordered cache of relayed payloads, oldest first.
#[derive(Debug)]
pub struct MessageCache {
    entries: VecDeque<Value>,
    max_entries: usize,
}

impl MessageCache {
    /// Create an empty cache holding at most `max_entries` payloads.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Append a payload, dropping the oldest entry when full.
    pub fn push(&mut self, payload: Value) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(payload);
    }

    /// Snapshot of all cached payloads, oldest first.
    pub fn snapshot(&self) -> Vec<Value> {
        self.entries.iter().cloned().collect()
    }

    /// Number of cached payloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
