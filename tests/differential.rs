//! Hand-rolled differential test (spec.md §8, "Round-trip and idempotence
//! laws"): drives randomized insert/remove/get sequences against both
//! `FlatMap` and `std::collections::HashMap` as an oracle, and checks that
//! every observable response agrees at every step.

use flatmap::FlatMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

#[test]
fn random_operation_sequence_matches_std_hashmap_oracle() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut flat: FlatMap<u16, u32> = FlatMap::new();
    let mut oracle: HashMap<u16, u32> = HashMap::new();

    for step in 0..20_000u32 {
        let key = rng.gen_range(0..64u16);
        match rng.gen_range(0..3) {
            0 => {
                let value = step;
                let expected = oracle.insert(key, value);
                let got = flat.insert(key, value).unwrap();
                assert_eq!(got, expected, "insert({key}, {value}) at step {step}");
            }
            1 => {
                let expected = oracle.remove(&key);
                let got = flat.remove(&key);
                assert_eq!(got, expected, "remove({key}) at step {step}");
            }
            _ => {
                let expected = oracle.get(&key);
                let got = flat.get(&key);
                assert_eq!(got, expected, "get({key}) at step {step}");
            }
        }
        assert_eq!(flat.len(), oracle.len(), "length diverged at step {step}");
    }

    let mut flat_keys: Vec<_> = flat.iter().map(|(k, _)| *k).collect();
    let mut oracle_keys: Vec<_> = oracle.keys().copied().collect();
    flat_keys.sort_unstable();
    oracle_keys.sort_unstable();
    assert_eq!(flat_keys, oracle_keys);
}
