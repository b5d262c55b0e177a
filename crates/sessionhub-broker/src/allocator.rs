//! Id allocation with FIFO recycling and threshold hysteresis.
//!
//! Freshly connected clients and newly created sessions receive sequential
//! ids. Released ids queue up in FIFO order; once the queue reaches the
//! configured threshold, the allocator switches to handing out recycled ids
//! (oldest first) and keeps doing so until the queue drains to empty. The
//! hysteresis avoids recycling churn under light disconnect/reconnect
//! traffic while bounding id growth under sustained churn.

use std::collections::VecDeque;

/// Issues and recycles `u32` ids.
///
/// Two independent instances exist in the broker, one for client ids and
/// one for session ids.
#[derive(Debug)]
pub struct IdAllocator {
    /// Next never-used id.
    next_sequential: u32,
    /// Released ids, oldest first.
    recycled: VecDeque<u32>,
    /// Whether `allocate` currently draws from the recycled queue.
    recycling_active: bool,
    /// Queue length at which recycling switches on.
    threshold: usize,
}

impl IdAllocator {
    /// Create an allocator that starts recycling once `threshold` released
    /// ids have queued up.
    pub fn new(threshold: usize) -> Self {
        Self {
            next_sequential: 0,
            recycled: VecDeque::new(),
            recycling_active: false,
            threshold,
        }
    }

    /// Hand out an id.
    ///
    /// While recycling is active the oldest released id is reused; popping
    /// the queue empty switches recycling back off. An id is never handed
    /// out while a live entity still holds it.
    pub fn allocate(&mut self) -> u32 {
        if self.recycling_active {
            if let Some(id) = self.recycled.pop_front() {
                if self.recycled.is_empty() {
                    self.recycling_active = false;
                }
                return id;
            }
            // Queue empty despite the active flag; fall back to the counter.
            self.recycling_active = false;
        }
        let id = self.next_sequential;
        self.next_sequential += 1;
        id
    }

    /// Return a released id to the queue.
    pub fn release(&mut self, id: u32) {
        self.recycled.push_back(id);
        if self.recycled.len() >= self.threshold {
            self.recycling_active = true;
        }
    }

    /// Whether `allocate` currently draws from the recycled queue.
    pub fn recycling_active(&self) -> bool {
        self.recycling_active
    }

    /// Number of released ids waiting for reuse.
    pub fn pending(&self) -> usize {
        self.recycled.len()
    }
}
