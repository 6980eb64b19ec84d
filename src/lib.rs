//! Tuple Cache - a memoization cache keyed by argument tuples
//!
//! Hashes tuples of primitives and object references into canonical keys,
//! with optional LRU eviction and timeout expiration.

pub mod cache;
pub mod config;
pub mod error;
pub mod hashing;
pub mod tasks;

pub use cache::{CacheStats, TupleMap};
pub use config::Config;
pub use error::{Result, TupleCacheError};
pub use hashing::{Arg, ArgKind, HashingEngine, ObjectRef, Tuple, TupleKey};
pub use tasks::spawn_expiry_task;
