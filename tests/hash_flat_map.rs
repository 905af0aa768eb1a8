use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};
use std::ops::Bound;

use flatrb::{Error, HashConfig, HashFlatMap, Natural, Reverse};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    -2_000i64..2_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

/// A hasher that folds every key into a handful of hash values, forcing long collision chains.
#[derive(Clone, Copy, Default)]
struct FewBuckets;

struct FewBucketsHasher(u64);

impl Hasher for FewBucketsHasher {
    fn finish(&self) -> u64 {
        (self.0 % 5) << 2
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.wrapping_mul(131).wrapping_add(u64::from(byte));
        }
    }
}

impl BuildHasher for FewBuckets {
    type Hasher = FewBucketsHasher;

    fn build_hasher(&self) -> FewBucketsHasher {
        FewBucketsHasher(0)
    }
}

/// A hasher that sends every key to the same bucket with the same fingerprint.
#[derive(Clone, Copy, Default)]
struct SameHash;

impl Hasher for SameHash {
    fn finish(&self) -> u64 {
        0x40
    }

    fn write(&mut self, _: &[u8]) {}
}

impl BuildHasher for SameHash {
    type Hasher = Self;

    fn build_hasher(&self) -> Self {
        Self
    }
}

fn config_strategy() -> impl Strategy<Value = HashConfig> {
    (0.25f64..=1.0, 0.1f64..1.0, 1.05f64..4.0).prop_map(|(load, ratio, growth)| {
        HashConfig::new().with_load_factor(load).with_hashable_ratio(ratio).with_growth_factor(growth)
    })
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    InsertOrAssign(i64, i64),
    Erase(i64),
    Get(i64),
    Find(i64),
    LowerBound(i64),
    PopFirst,
    PopLast,
    Reserve(usize),
    ShrinkToFit,
    RemoveAt(i64),
    RemoveLastByCursor,
    RemoveRange(i64, i64),
    Retain(i64),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::InsertOrAssign(k, v)),
        4 => key_strategy().prop_map(MapOp::Erase),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::Find),
        1 => key_strategy().prop_map(MapOp::LowerBound),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
        1 => (0usize..100).prop_map(MapOp::Reserve),
        1 => Just(MapOp::ShrinkToFit),
        2 => key_strategy().prop_map(MapOp::RemoveAt),
        1 => Just(MapOp::RemoveLastByCursor),
        1 => (key_strategy(), key_strategy()).prop_map(|(a, b)| MapOp::RemoveRange(a, b)),
        1 => (5i64..40).prop_map(MapOp::Retain),
    ]
}

fn replay<S: BuildHasher>(map: &mut HashFlatMap<i64, i64, S>, ops: &[MapOp]) -> Result<(), TestCaseError> {
    let mut bt: BTreeMap<i64, i64> = BTreeMap::new();
    for op in ops {
        match *op {
            MapOp::Insert(k, v) => {
                let inserted = map.insert(k, v).1;
                prop_assert_eq!(inserted, !bt.contains_key(&k), "insert({}, {})", k, v);
                bt.entry(k).or_insert(v);
            }
            MapOp::InsertOrAssign(k, v) => {
                prop_assert_eq!(map.insert_or_assign(k, v), bt.insert(k, v), "insert_or_assign({}, {})", k, v);
            }
            MapOp::Erase(k) => {
                prop_assert_eq!(map.erase(&k), usize::from(bt.remove(&k).is_some()), "erase({})", k);
            }
            MapOp::Get(k) => {
                prop_assert_eq!(map.get(&k), bt.get(&k), "get({})", k);
                prop_assert_eq!(map.contains_key(&k), bt.contains_key(&k), "contains_key({})", k);
            }
            MapOp::Find(k) => {
                let expected = bt.get_key_value(&k);
                prop_assert_eq!(map.find(&k).key_value(), expected, "find({})", k);
            }
            MapOp::LowerBound(k) => {
                prop_assert_eq!(map.lower_bound(&k).key_value(), bt.range(k..).next(), "lower_bound({})", k);
            }
            MapOp::PopFirst => prop_assert_eq!(map.pop_first(), bt.pop_first()),
            MapOp::PopLast => prop_assert_eq!(map.pop_last(), bt.pop_last()),
            MapOp::Reserve(additional) => {
                map.reserve(additional);
                let limit = (map.capacity() as f64 * map.config().load_factor()) as usize;
                prop_assert!(limit >= map.len() + additional, "reserve({})", additional);
            }
            MapOp::ShrinkToFit => map.shrink_to_fit(),
            MapOp::RemoveAt(k) => {
                let expected = bt.remove_entry(&k);
                let mut cursor = map.find_mut(&k);
                prop_assert_eq!(cursor.remove_current(), expected, "remove_current at {}", k);
                if expected.is_some() {
                    prop_assert_eq!(cursor.key(), bt.range(k..).next().map(|(key, _)| key), "next after {}", k);
                }
            }
            MapOp::RemoveLastByCursor => {
                let mut cursor = map.rbegin_mut();
                prop_assert_eq!(cursor.remove_current(), bt.pop_last());
                prop_assert_eq!(cursor.key(), bt.keys().next_back());
            }
            MapOp::RemoveRange(a, b) => {
                let (lo, hi) = (a.min(b), a.max(b));
                let before = bt.len();
                bt.retain(|key, _| !(lo..hi).contains(key));
                prop_assert_eq!(map.remove_range(lo..hi), before - bt.len(), "remove_range({}..{})", lo, hi);
            }
            MapOp::Retain(modulus) => {
                let keep = |key: &i64, value: &mut i64| {
                    *value = value.wrapping_add(1);
                    key.rem_euclid(modulus) != 0
                };
                map.retain(keep);
                bt.retain(keep);
            }
        }
        prop_assert_eq!(map.len(), bt.len(), "len mismatch after {:?}", op);
        prop_assert!(map.capacity() >= map.len());
    }
    prop_assert!(map.iter().eq(bt.iter()));
    prop_assert!(map.iter().rev().eq(bt.iter().rev()));
    Ok(())
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations against BTreeMap with the default hasher.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map = HashFlatMap::new();
        replay(&mut map, &ops)?;
    }

    /// Replays random operations with a hasher that piles keys into five buckets.
    #[test]
    fn clumped_map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE / 5)) {
        let mut map = HashFlatMap::with_hasher(FewBuckets);
        replay(&mut map, &ops)?;
    }

    /// Replays random operations under arbitrary valid sizing policies.
    #[test]
    fn configured_map_ops_match_btreemap(
        config in config_strategy(),
        capacity in 0usize..64,
        ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE / 5),
    ) {
        let mut map = HashFlatMap::with_config(capacity, config, ahash::RandomState::new(), Natural)
            .expect("config is valid");
        prop_assert_eq!(map.capacity(), capacity);
        replay(&mut map, &ops)?;
        prop_assert_eq!(map.config(), &config);
    }

    /// Tests range matches BTreeMap for random bounds.
    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        a in key_strategy(),
        b in key_strategy(),
    ) {
        let map: HashFlatMap<i64, i64> = entries.iter().copied().collect();
        let bt: BTreeMap<i64, i64> = entries.iter().copied().collect();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(map.range(lo..hi).eq(bt.range(lo..hi)));
        prop_assert!(map.range(lo..=hi).rev().eq(bt.range(lo..=hi).rev()));
        prop_assert!(map.range(..=lo).eq(bt.range(..=lo)));
    }

    /// Merging moves exactly the keys the destination lacks, even across hashers.
    #[test]
    fn merge_partitions_keys(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 2),
    ) {
        let mut a: HashFlatMap<i64, i64> = entries_a.iter().copied().collect();
        let mut b: HashFlatMap<i64, i64> = entries_b.iter().copied().collect();
        let bt_a: BTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let bt_b: BTreeMap<i64, i64> = entries_b.iter().copied().collect();

        a.merge(&mut b);

        let mut expected_a = bt_a.clone();
        for (k, v) in &bt_b {
            expected_a.entry(*k).or_insert(*v);
        }
        prop_assert!(a.iter().eq(expected_a.iter()));
        for (k, v) in &b {
            prop_assert_eq!(bt_b.get(k), Some(v));
            prop_assert!(bt_a.contains_key(k));
            prop_assert_eq!(b.get(k), Some(v));
        }
    }
}

// ─── Worked scenarios ────────────────────────────────────────────────────────

#[test]
fn mixed_inserts_iterate_sorted() {
    let mut map = HashFlatMap::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        map.insert(key, ());
    }
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);

    assert_eq!(map.erase(&5), 1);
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 7, 8, 9]);
    assert!(!map.find(&3).is_end());
    assert!(map.find(&100).is_end());
}

#[test]
fn growth_past_initial_capacity_keeps_every_entry() {
    let mut map = HashFlatMap::with_capacity(4);
    for key in 0..1_000 {
        map.insert(key, key.to_string());
    }
    assert!(map.capacity() >= 1_000);
    assert_eq!(map.len(), 1_000);
    assert!(map.keys().copied().eq(0..1_000));
    for key in 0..1_000 {
        assert_eq!(map.get(&key), Some(&key.to_string()));
    }
}

#[test]
fn load_factor_stays_under_the_configured_limit() {
    let config = HashConfig::new().with_load_factor(0.5);
    let mut map = HashFlatMap::with_config(0, config, ahash::RandomState::new(), Natural).expect("config is valid");
    for key in 0..500 {
        map.insert(key, key);
        assert!(map.len() * 2 <= map.capacity(), "len {} capacity {}", map.len(), map.capacity());
    }
    assert!(map.load_factor() <= 0.5);
}

#[test]
fn invalid_configs_are_rejected() {
    for config in [
        HashConfig::new().with_load_factor(0.0),
        HashConfig::new().with_load_factor(1.01),
        HashConfig::new().with_hashable_ratio(-0.5),
        HashConfig::new().with_hashable_ratio(1.0),
        HashConfig::new().with_growth_factor(0.9),
        HashConfig::new().with_growth_factor(f64::NAN),
    ] {
        let result = HashFlatMap::<i32, i32>::with_config(8, config, ahash::RandomState::new(), Natural);
        assert!(matches!(result, Err(Error::InvalidConfig(_))), "{config:?} was accepted");
    }
}

#[test]
fn identical_hashes_fit_under_a_near_full_hashable_ratio() {
    let config = HashConfig::new().with_hashable_ratio(0.99);
    let mut map = HashFlatMap::with_config(8, config, SameHash, Natural).expect("config is valid");
    map.insert(1, 1);
    map.insert(2, 2);
    assert_eq!(map.capacity(), 8);
    for key in 3..=64 {
        map.insert(key, key);
    }
    assert_eq!(map.len(), 64);
    assert_eq!(map.capacity(), 8_192);
    assert!(map.keys().copied().eq(1..=64));
    for key in (1..=64).step_by(3) {
        assert_eq!(map.remove(&key), Some(key));
    }
    assert!((1..=64).all(|key| map.contains_key(&key) == (key % 3 != 1)));
}

#[test]
fn first_and_last_follow_inserts_and_erases() {
    let mut map = HashFlatMap::with_hasher(FewBuckets);
    map.insert(10, 'a');
    map.insert(5, 'b');
    map.insert(20, 'c');
    assert_eq!(map.first_key_value(), Some((&5, &'b')));
    assert_eq!(map.last_key_value(), Some((&20, &'c')));
    map.erase(&5);
    map.erase(&20);
    assert_eq!(map.first_key_value(), Some((&10, &'a')));
    assert_eq!(map.last_key_value(), Some((&10, &'a')));
    map.erase(&10);
    assert_eq!(map.first_key_value(), None);
    assert_eq!(map.begin(), map.end());
}

#[test]
fn at_and_index_agree() {
    let map = HashFlatMap::from([("x", 1), ("y", 2)]);
    assert_eq!(map.at("x"), Ok(&1));
    assert_eq!(map["y"], 2);
    assert_eq!(map.at("z"), Err(Error::KeyNotFound));
}

#[test]
fn reverse_comparator_with_hashing() {
    let mut map = HashFlatMap::with_hasher_and_comparator(ahash::RandomState::new(), Reverse);
    map.extend((0..10).map(|k| (k, k * k)));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), (0..10).rev().collect::<Vec<_>>());
    assert_eq!(map.get(&3), Some(&9));
    assert_eq!(map.range(7..=4).count(), 4);
}

#[test]
fn clear_keeps_capacity() {
    let mut map: HashFlatMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
    let capacity = map.capacity();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.capacity(), capacity);
    assert_eq!(map.get(&5), None);
    map.insert(5, 6);
    assert_eq!(map.get(&5), Some(&6));
}

#[test]
fn clone_is_independent() {
    let original: HashFlatMap<i32, i32> = (0..50).map(|k| (k, k)).collect();
    let mut copy = original.clone();
    copy.erase(&10);
    copy.insert(100, 100);
    assert_eq!(original.len(), 50);
    assert!(original.contains_key(&10));
    assert!(!original.contains_key(&100));
    assert_ne!(original, copy);
}

#[test]
fn iter_mut_reaches_every_value() {
    let mut map: HashFlatMap<i32, i32> = (0..100).map(|k| (k, k)).collect();
    for (k, v) in &mut map {
        *v += *k;
    }
    assert!(map.values().copied().eq((0..100).map(|k| k * 2)));
}

#[test]
#[should_panic(expected = "range start is greater than range end")]
fn range_start_greater_than_end_panics() {
    let map: HashFlatMap<i32, i32> = [(1, 1), (2, 2), (3, 3)].into_iter().collect();
    let _: Vec<_> = map.range((Bound::Included(5), Bound::Included(3))).collect();
}

#[test]
fn extend_ignores_an_unsatisfiable_size_hint() {
    struct Overstated(core::ops::Range<i32>);

    impl Iterator for Overstated {
        type Item = (i32, i32);

        fn next(&mut self) -> Option<Self::Item> {
            self.0.next().map(|k| (k, -k))
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            (usize::MAX, None)
        }
    }

    let mut map = HashFlatMap::new();
    map.extend(Overstated(0..100));
    assert_eq!(map.len(), 100);
    assert_eq!(map.get(&42), Some(&-42));
    assert!(map.keys().copied().eq(0..100));
}

// ─── Seeded soak tests ───────────────────────────────────────────────────────

#[test]
fn seeded_random_churn() {
    let mut rng = StdRng::seed_from_u64(0xf1a7);
    let mut map = HashFlatMap::new();
    let mut bt = BTreeMap::new();
    for _ in 0..100_000 {
        let key: u32 = rng.gen_range(0..20_000);
        match rng.gen_range(0..10) {
            0..=5 => {
                map.insert_or_assign(key, u64::from(key) << 3);
                bt.insert(key, u64::from(key) << 3);
            }
            6..=8 => assert_eq!(map.remove(&key), bt.remove(&key)),
            _ => assert_eq!(map.pop_first(), bt.pop_first()),
        }
    }
    assert_eq!(map.len(), bt.len());
    assert!(map.iter().eq(bt.iter()));
}

#[test]
fn seeded_clumped_churn() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut map = HashFlatMap::with_hasher(FewBuckets);
    let mut bt = BTreeMap::new();
    for _ in 0..10_000 {
        let key: i16 = rng.gen_range(-300..300);
        if rng.gen_bool(0.55) {
            assert_eq!(map.insert(key, ()).1, bt.insert(key, ()).is_none());
        } else {
            assert_eq!(map.erase(&key), usize::from(bt.remove(&key).is_some()));
        }
    }
    assert!(map.keys().eq(bt.keys()));
}
