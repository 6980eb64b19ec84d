//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check hashing and eviction properties over generated
//! tuples and operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::TupleMap;
use crate::hashing::{Arg, HashingEngine, ObjectRef, Tuple};

// == Strategies ==
/// Generates primitive arguments of every kind
fn primitive_strategy() -> impl Strategy<Value = Arg> {
    prop_oneof![
        Just(Arg::Undefined),
        Just(Arg::Null),
        any::<bool>().prop_map(Arg::Bool),
        any::<i64>().prop_map(Arg::Int),
        any::<f64>().prop_map(Arg::Number),
        "[a-zA-Z0-9 _]{0,16}".prop_map(Arg::Text),
    ]
}

/// Generates primitive-only tuples
fn primitive_tuple_strategy() -> impl Strategy<Value = Vec<Arg>> {
    prop::collection::vec(primitive_strategy(), 0..6)
}

/// Generates distinct single-text keys
fn unique_keys_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", min..max).prop_map(|keys| keys.into_iter().collect())
}

fn key(text: &str) -> Tuple {
    crate::tuple![text]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hashing equal primitive values as distinct tuple instances gives
    // the same hash.
    #[test]
    fn prop_primitive_hash_is_deterministic(args in primitive_tuple_strategy()) {
        let mut engine = HashingEngine::new();
        let first = engine.hash(&Tuple::new(args.clone()));
        let second = engine.hash(&Tuple::new(args));
        prop_assert_eq!(first, second);
    }

    // A number and the text of that same number never share a hash.
    #[test]
    fn prop_numbers_and_text_never_collide(n in any::<i64>()) {
        let mut engine = HashingEngine::new();
        let number = engine.hash(&crate::tuple![n]);
        let text = engine.hash(&crate::tuple![n.to_string()]);
        prop_assert_ne!(number, text);
    }

    // The last-seen shortcut returns what a fresh hash would.
    #[test]
    fn prop_last_seen_matches_fresh(args in primitive_tuple_strategy(), objects in 0usize..4) {
        let mut engine = HashingEngine::new();
        let mut all = args;
        all.extend((0..objects).map(|i| Arg::Object(ObjectRef::new(i))));
        let tuple = Tuple::new(all);

        let first = engine.hash(&tuple);
        let memoized = engine.hash(&tuple);
        let fresh = engine.hash(&Tuple::new(tuple.args().to_vec()));

        prop_assert_eq!(&first, &memoized);
        prop_assert_eq!(&first, &fresh);
    }

    // Distinct objects always receive distinct surrogate ids.
    #[test]
    fn prop_distinct_objects_distinct_ids(count in 1usize..32) {
        let mut engine = HashingEngine::new();
        let objects: Vec<ObjectRef> = (0..count).map(|_| ObjectRef::new(0u8)).collect();

        let hashes: HashSet<String> = objects
            .iter()
            .map(|object| engine.hash(&Arg::Object(object.clone())))
            .collect();

        prop_assert_eq!(hashes.len(), count);
    }

    // The entry count never exceeds the limit after a set.
    #[test]
    fn prop_capacity_enforcement(
        keys in prop::collection::vec("[a-z]{1,4}", 1..100),
        limit in 1usize..10
    ) {
        let mut cache = TupleMap::new(None, Some(limit));

        for (i, text) in keys.iter().enumerate() {
            cache.set(&key(text), i);
            prop_assert!(
                cache.count() <= limit,
                "Cache size {} exceeds limit {}",
                cache.count(),
                limit
            );
        }
    }

    // Filling to capacity then adding one more evicts the first key only.
    #[test]
    fn prop_lru_eviction_order(keys in unique_keys_strategy(2, 10)) {
        let (new_key, initial) = keys.split_last().unwrap();
        prop_assume!(initial.len() >= 2);

        let mut cache = TupleMap::new(None, Some(initial.len()));
        for text in initial {
            cache.set(&key(text), text.clone());
        }

        cache.set(&key(new_key), new_key.clone());

        prop_assert!(!cache.has(&key(&initial[0])), "Oldest key should be evicted");
        for text in initial.iter().skip(1) {
            prop_assert!(cache.has(&key(text)), "Key '{}' should remain", text);
        }
        prop_assert!(cache.has(&key(new_key)));
    }

    // A get on the oldest key protects it; the next oldest goes instead.
    #[test]
    fn prop_get_protects_from_eviction(keys in unique_keys_strategy(4, 10)) {
        let (new_key, initial) = keys.split_last().unwrap();

        let mut cache = TupleMap::new(None, Some(initial.len()));
        for text in initial {
            cache.set(&key(text), text.clone());
        }

        let touched = cache.get(&key(&initial[0]), String::new());
        prop_assert_eq!(&touched, &initial[0]);

        cache.set(&key(new_key), new_key.clone());

        prop_assert!(cache.has(&key(&initial[0])));
        prop_assert!(!cache.has(&key(&initial[1])));
    }
}
