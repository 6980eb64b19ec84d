//! Identity Table Module
//!
//! Assigns surrogate ids (`#0`, `#1`, ...) to reference-like arguments.
//!
//! Entries are keyed by allocation address and hold only a `Weak` handle,
//! so the table never keeps an argument alive. The `Weak` also pins the
//! allocation itself, which keeps the address from being reused by another
//! object while the entry exists.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Weak;

use tracing::trace;

use crate::hashing::ObjectRef;

// == Identity ==
#[derive(Debug)]
struct Identity {
    /// Surrogate id, e.g. `#3`
    id: String,
    /// Weak handle to the argument
    object: Weak<dyn Any + Send + Sync>,
    /// Number of live cache entries whose hash uses this id
    holders: usize,
}

// == Identity Table ==
/// Address-keyed map from reference-like argument to surrogate id.
#[derive(Debug, Default)]
pub struct IdentityTable {
    by_addr: HashMap<usize, Identity>,
    /// Next id to mint; 64 bits never wrap in practice
    next_id: u64,
}

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    // == Surrogate ==
    /// Returns the surrogate id of `object`, minting one on first sighting.
    ///
    /// The second element is the table key to pass to [`acquire`] and
    /// [`release`].
    ///
    /// [`acquire`]: IdentityTable::acquire
    /// [`release`]: IdentityTable::release
    pub fn surrogate(&mut self, object: &ObjectRef) -> (String, usize) {
        let addr = object.addr();
        if let Some(identity) = self.by_addr.get(&addr) {
            return (identity.id.clone(), addr);
        }

        let id = format!("#{}", self.next_id);
        self.next_id += 1;
        trace!(id = %id, "Minted surrogate id");

        self.by_addr.insert(
            addr,
            Identity {
                id: id.clone(),
                object: object.downgrade(),
                holders: 0,
            },
        );
        (id, addr)
    }

    /// Returns true if `object` already has a surrogate id.
    pub fn contains(&self, object: &ObjectRef) -> bool {
        self.by_addr.contains_key(&object.addr())
    }

    // == Acquire ==
    /// Records one more live cache entry using each of `addrs`.
    pub fn acquire(&mut self, addrs: &[usize]) {
        for addr in addrs {
            if let Some(identity) = self.by_addr.get_mut(addr) {
                identity.holders += 1;
            }
        }
    }

    // == Release ==
    /// Drops one holder from each of `addrs`.
    ///
    /// Identities left without holders are removed from the table. Unknown
    /// addresses are ignored, so releasing twice is harmless.
    ///
    /// Returns the number of identities removed.
    pub fn release(&mut self, addrs: &[usize]) -> usize {
        let mut removed = 0;
        for addr in addrs {
            let unheld = match self.by_addr.get_mut(addr) {
                Some(identity) => {
                    identity.holders = identity.holders.saturating_sub(1);
                    identity.holders == 0
                }
                None => false,
            };
            if unheld {
                self.by_addr.remove(addr);
                removed += 1;
            }
        }
        removed
    }

    // == Prune ==
    /// Removes identities whose argument was dropped and that no entry holds.
    pub fn prune(&mut self) -> usize {
        let before = self.by_addr.len();
        self.by_addr
            .retain(|_, identity| identity.holders > 0 || identity.object.strong_count() > 0);
        before - self.by_addr.len()
    }

    /// Forgets every identity and restarts ids at `#0`.
    pub fn clear(&mut self) {
        self.by_addr.clear();
        self.next_id = 0;
    }

    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_object_same_id() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new(vec![1, 2, 3]);

        let (first, addr) = table.surrogate(&obj);
        let (second, _) = table.surrogate(&obj.clone());

        assert_eq!(first, "#0");
        assert_eq!(first, second);
        assert_eq!(addr, obj.addr());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_equal_objects_get_distinct_ids() {
        let mut table = IdentityTable::new();
        let a = ObjectRef::new(vec![1, 2, 3]);
        let b = ObjectRef::new(vec![1, 2, 3]);

        assert_eq!(table.surrogate(&a).0, "#0");
        assert_eq!(table.surrogate(&b).0, "#1");
    }

    #[test]
    fn test_release_removes_unheld() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new("x");
        let (_, addr) = table.surrogate(&obj);

        table.acquire(&[addr]);
        table.acquire(&[addr]);

        assert_eq!(table.release(&[addr]), 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.release(&[addr]), 1);
        assert!(table.is_empty());

        // Idempotent
        assert_eq!(table.release(&[addr]), 0);
    }

    #[test]
    fn test_contains_does_not_mint() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new(5u8);

        assert!(!table.contains(&obj));
        assert!(table.is_empty());

        table.surrogate(&obj);
        assert!(table.contains(&obj.clone()));
        assert!(!table.contains(&ObjectRef::new(5u8)));
    }

    #[test]
    fn test_release_unknown_address() {
        let mut table = IdentityTable::new();
        assert_eq!(table.release(&[0xdead]), 0);
    }

    #[test]
    fn test_table_does_not_keep_objects_alive() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new(String::from("short lived"));
        table.surrogate(&obj);
        drop(obj);

        assert_eq!(table.prune(), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn test_prune_keeps_held_identities() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new(1u8);
        let (_, addr) = table.surrogate(&obj);
        table.acquire(&[addr]);
        drop(obj);

        assert_eq!(table.prune(), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_clear_restarts_ids() {
        let mut table = IdentityTable::new();
        let obj = ObjectRef::new(0u32);
        table.surrogate(&obj);
        table.surrogate(&ObjectRef::new(1u32));

        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.surrogate(&obj).0, "#0");
    }
}
