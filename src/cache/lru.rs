//! LRU Tracker Module
//!
//! Keeps the recency order of canonical hashes for bounded caches.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Recency order of cached hashes.
///
/// Hashes are stored in a VecDeque where:
/// - Front = Least recently used (next eviction candidate)
/// - Back = Most recently inserted or refreshed
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Moves `hash` to the most recent position, adding it if untracked.
    pub fn touch(&mut self, hash: &str) {
        self.remove(hash);
        self.order.push_back(hash.to_string());
    }

    // == Remove ==
    /// Stops tracking `hash`. Unknown hashes are ignored.
    pub fn remove(&mut self, hash: &str) {
        if let Some(pos) = self.order.iter().position(|h| h == hash) {
            self.order.remove(pos);
        }
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used hash.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, hash: &str) -> bool {
        self.order.iter().any(|h| h == hash)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
