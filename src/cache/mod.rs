//! Cache Module
//!
//! Tuple-keyed memoization storage with optional LRU eviction and
//! timeout expiration.

mod entry;
mod lru;
mod stats;
mod store;
mod timers;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::TupleMap;
pub use timers::TimerQueue;
