//! Cache Entry Module
//!
//! Defines the structure stored per canonical hash.

// == Cache Entry ==
/// A cached value and the identities its hash is built from.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Identity-table keys held by this entry, released when it dies
    pub identities: Vec<usize>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry holding `identities`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `identities` - Identity-table keys from the entry's hash
    pub fn new(value: V, identities: Vec<usize>) -> Self {
        Self { value, identities }
    }

    /// Replaces the value, keeping the held identities.
    ///
    /// The hash is unchanged, so it still names the same identities.
    pub fn replace(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}
