//! Hashing Engine Module
//!
//! Turns a tuple key into its canonical string hash.

use std::sync::{Arc, Weak};

use tracing::trace;

use crate::hashing::{Arg, IdentityTable, TupleKey};

/// Joins per-position segments. Chosen so it cannot plausibly occur inside
/// a serialized primitive.
pub const SEPARATOR: &str = "/<[MI_SEP]>/";

/// Stand-in for positions a key declares but cannot supply.
static UNDEFINED: Arg = Arg::Undefined;

const MAX_PREALLOCATED_SEGMENTS: usize = 64;

// == Hashed Key ==
/// A canonical hash together with the identities it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HashedKey {
    pub hash: String,
    /// Identity-table keys of the reference-like arguments, deduplicated
    pub identities: Vec<usize>,
}

// == Last Seen ==
#[derive(Debug)]
struct LastSeen {
    tuple: Weak<[Arg]>,
    key: HashedKey,
}

// == Hashing Engine ==
/// Canonical hashing with identity tracking and a last-seen shortcut.
///
/// Surrogate ids are scoped to the engine, so two engines (and two caches)
/// never share ids.
#[derive(Debug, Default)]
pub struct HashingEngine {
    identities: IdentityTable,
    last_seen: Option<LastSeen>,
}

impl HashingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hash ==
    /// Returns the canonical hash of `key`.
    pub fn hash<K>(&mut self, key: &K) -> String
    where
        K: TupleKey + ?Sized,
    {
        self.hash_key(key).hash
    }

    pub(crate) fn hash_key<K>(&mut self, key: &K) -> HashedKey
    where
        K: TupleKey + ?Sized,
    {
        if let Some(hit) = self.last_seen_for(key) {
            trace!(hash = %hit.hash, "Last-seen tuple hit");
            return hit;
        }

        let length = key.arity().unwrap_or(1);
        // Arity is caller-declared, so it only sizes a bounded preallocation
        let mut segments = Vec::with_capacity(length.min(MAX_PREALLOCATED_SEGMENTS));
        let mut identities = Vec::new();

        for index in 0..length {
            let arg = key.arg(index).unwrap_or(&UNDEFINED);
            match arg.as_reference() {
                Some(object) => {
                    let (id, addr) = self.identities.surrogate(object);
                    if !identities.contains(&addr) {
                        identities.push(addr);
                    }
                    segments.push(id);
                }
                // Primitives always have a segment
                None => segments.extend(arg.primitive_segment()),
            }
        }

        let hashed = HashedKey {
            hash: segments.join(SEPARATOR),
            identities,
        };

        self.last_seen = key.instance().map(|tuple| LastSeen {
            tuple: Arc::downgrade(tuple),
            key: hashed.clone(),
        });

        hashed
    }

    /// Hash of `key` for a read-only lookup.
    ///
    /// Returns `None` when `key` holds a reference-like argument the table
    /// has never seen. Every stored entry's identities are in the table, so
    /// such a key cannot be cached, and no id is minted for it.
    pub(crate) fn lookup_hash<K>(&mut self, key: &K) -> Option<String>
    where
        K: TupleKey + ?Sized,
    {
        if let Some(hit) = self.last_seen_for(key) {
            return Some(hit.hash);
        }

        let length = key.arity().unwrap_or(1);
        let unknown = (0..length)
            .filter_map(|index| key.arg(index))
            .filter_map(Arg::as_reference)
            .any(|object| !self.identities.contains(object));
        if unknown {
            return None;
        }

        Some(self.hash_key(key).hash)
    }

    fn last_seen_for<K>(&self, key: &K) -> Option<HashedKey>
    where
        K: TupleKey + ?Sized,
    {
        let tuple = key.instance()?;
        let seen = self.last_seen.as_ref()?;
        // The Weak pins the allocation, so an equal address is the same tuple
        std::ptr::eq(seen.tuple.as_ptr(), Arc::as_ptr(tuple)).then(|| seen.key.clone())
    }

    /// Hash of the last tuple recorded by the shortcut, if any.
    pub fn last_hash(&self) -> Option<&str> {
        self.last_seen.as_ref().map(|seen| seen.key.hash.as_str())
    }

    /// Drops the last-seen shortcut.
    pub fn forget_last_seen(&mut self) {
        self.last_seen = None;
    }

    // == Identity Lifetime ==
    pub(crate) fn acquire(&mut self, identities: &[usize]) {
        self.identities.acquire(identities);
    }

    /// Releases identities held by a dying entry.
    ///
    /// When any identity leaves the table the shortcut is dropped too, since
    /// its hash may name an id that no longer exists.
    pub(crate) fn release(&mut self, identities: &[usize]) -> usize {
        let removed = self.identities.release(identities);
        if removed > 0 {
            self.forget_last_seen();
        }
        removed
    }

    /// Removes identities of dropped arguments that no entry holds.
    pub fn prune(&mut self) -> usize {
        self.identities.prune()
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// Resets identities, the id counter and the shortcut.
    pub fn clear(&mut self) {
        self.identities.clear();
        self.last_seen = None;
    }
}
