//! Integration coverage for the seed scenarios of spec.md §8, exercised
//! purely through `flatmap`'s public API (no crate-internal access).

use flatmap::FlatMap;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

/// A deliberately low-entropy hasher: every key's top bits collapse onto
/// the same fingerprint, so a handful of distinct keys are forced into
/// the same probe group. Used to exercise the erase-through-probe-chain
/// and fingerprint-collision scenarios without depending on `RandomState`
/// internals.
#[derive(Clone, Default)]
struct CollidingHasher;

impl BuildHasher for CollidingHasher {
    type Hasher = CollidingHasherImpl;
    fn build_hasher(&self) -> CollidingHasherImpl {
        CollidingHasherImpl(0)
    }
}

struct CollidingHasherImpl(u64);

impl Hasher for CollidingHasherImpl {
    fn write(&mut self, bytes: &[u8]) {
        // fold the key's low byte into the low bits only, so the top 7
        // bits (the fingerprint, and most of the bucket index) stay fixed.
        for &b in bytes {
            self.0 = (self.0 << 8) | b as u64;
        }
    }
    fn finish(&self) -> u64 {
        self.0 & 0xFF
    }
}

#[test]
fn fingerprint_colliding_keys_survive_middle_erase() {
    let mut map: FlatMap<u64, u64, CollidingHasher> = FlatMap::with_hasher(CollidingHasher);
    for k in 0..3u64 {
        map.insert(k, k * 10).unwrap();
    }
    assert_eq!(map.remove(&1), Some(10));
    assert_eq!(map.get(&0), Some(&0));
    assert_eq!(map.get(&2), Some(&20));
    assert_eq!(map.get(&1), None);
}

#[test]
fn fill_to_load_factor_triggers_rehash_and_preserves_keys() {
    let mut map: FlatMap<u64, u64> = FlatMap::new();
    for k in 0..14u64 {
        map.insert(k, k).unwrap();
    }
    assert_eq!(map.len(), 14);
    for k in 0..14u64 {
        assert_eq!(map.get(&k), Some(&k));
    }
    // one more insert must still succeed, triggering growth.
    map.insert(14, 14).unwrap();
    assert_eq!(map.len(), 15);
    for k in 0..=14u64 {
        assert_eq!(map.get(&k), Some(&k));
    }
}

#[test]
fn erase_every_element_then_reinsert_restores_identical_view() {
    let mut map: FlatMap<u64, u64> = FlatMap::new();
    for k in 0..20u64 {
        map.insert(k, k * 2).unwrap();
    }
    for k in 0..20u64 {
        assert!(map.remove(&k).is_some());
    }
    assert_eq!(map.len(), 0);
    assert_eq!(map.iter().count(), 0);
    for k in 0..20u64 {
        map.insert(k, k * 2).unwrap();
    }
    assert_eq!(map.len(), 20);
    for k in 0..20u64 {
        assert_eq!(map.get(&k), Some(&(k * 2)));
    }
}

#[test]
fn swap_entry_exchanges_values_in_place_and_reports_occupancy() {
    let mut map: FlatMap<u64, String> = FlatMap::new();
    map.insert(1, "old".to_string()).unwrap();

    let mut incoming = "new".to_string();
    let was_occupied = map.swap_entry(1, &mut incoming).unwrap();
    assert!(was_occupied);
    assert_eq!(incoming, "old");
    assert_eq!(map.get(&1), Some(&"new".to_string()));

    let mut fresh = "inserted".to_string();
    let was_occupied = map.swap_entry(2, &mut fresh).unwrap();
    assert!(!was_occupied);
    assert_eq!(map.get(&2), Some(&"inserted".to_string()));
}

#[test]
fn try_insert_never_overwrites_an_existing_value() {
    let mut map: FlatMap<u64, u64> = FlatMap::new();
    map.try_insert(1, 100).unwrap();
    map.try_insert(1, 999).unwrap();
    assert_eq!(map.get(&1), Some(&100));
}

#[test]
fn in_place_rehash_reclaims_tombstones_on_a_fixed_capacity_table() {
    let mut map: FlatMap<u64, u64> = FlatMap::with_fixed_capacity(8).unwrap();
    let capacity = map.capacity();
    // fill to just under the 7/8 load factor, then erase all but one.
    let usable = (capacity / 8) * 7;
    for k in 0..usable as u64 {
        map.insert(k, k).unwrap();
    }
    for k in 0..(usable as u64 - 1) {
        map.remove(&k);
    }
    let survivor = usable as u64 - 1;
    assert_eq!(map.get(&survivor), Some(&survivor));
    // the table must still accept new inserts by reclaiming tombstones,
    // since a fixed-capacity table never grows.
    map.insert(1000, 1000).unwrap();
    assert_eq!(map.get(&survivor), Some(&survivor));
    assert_eq!(map.get(&1000), Some(&1000));
}

#[test]
fn iteration_visits_every_live_record_exactly_once_across_group_boundaries() {
    let mut map: FlatMap<u64, u64> = FlatMap::new();
    for k in 0..64u64 {
        map.insert(k, k).unwrap();
    }
    let mut seen: Vec<u64> = map.iter().map(|(k, _)| *k).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..64).collect::<Vec<_>>());
}

#[test]
fn iterating_a_never_touched_fixed_capacity_map_yields_nothing() {
    // a fixed-capacity table reports a nonzero `capacity()` from
    // construction, before the lazy initializer has ever zeroed its tag
    // array; iterating it must see zero elements rather than dereference
    // the still-null tag pointer.
    let map: FlatMap<u64, u64> = FlatMap::with_fixed_capacity(8).unwrap();
    assert!(map.capacity() > 0);
    assert_eq!(map.iter().count(), 0);
    assert_eq!(map.into_iter().count(), 0);
}

#[test]
fn default_hasher_map_behaves_like_a_standard_hash_map() {
    let hasher = RandomState::new();
    let mut map: FlatMap<String, i32, RandomState> = FlatMap::with_hasher(hasher);
    map.insert("a".to_string(), 1).unwrap();
    map.insert("b".to_string(), 2).unwrap();
    assert_eq!(map.insert("a".to_string(), 10).unwrap(), Some(1));
    assert_eq!(map.get("b"), Some(&2));
    assert_eq!(map.len(), 2);
}
