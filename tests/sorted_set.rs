use std::collections::BTreeSet as StdBTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use sorted_set::{BTreeSet, EmptySetError, Engine, Natural, SortedSet, WavlTreeSet, by_key};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn init_logging() {
    let _r = env_logger::builder().is_test(true).try_init();
}

fn new_set<E: Ord + 'static>(engine: Engine) -> Box<dyn SortedSet<E>> {
    engine.create(Natural)
}

fn shuffled(range: std::ops::RangeInclusive<i32>, seed: u64) -> Vec<i32> {
    let mut values: Vec<i32> = range.collect();
    values.shuffle(&mut StdRng::seed_from_u64(seed));
    values
}

/// Empties `set` through `first()` + `remove(first())`, checking membership along the way.
fn drain<E: Clone + PartialEq + std::fmt::Debug>(set: &mut dyn SortedSet<E>) -> Vec<E> {
    let mut out = Vec::new();
    while !set.is_empty() {
        let first = set.first().expect("non-empty set has a first element").clone();
        assert!(set.contains(&first));
        assert!(set.remove(&first), "remove({first:?})");
        assert!(!set.contains(&first));
        out.push(first);
    }
    assert_eq!(set.first(), Err(EmptySetError));
    out
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn small_set_comes_out_sorted() {
    init_logging();
    for engine in Engine::ALL {
        for order in [[1, 2, 5, 6], [2, 6, 1, 5], [6, 2, 5, 1]] {
            let mut set = new_set(engine);
            for x in order {
                assert!(set.insert(x));
            }
            assert_eq!(set.first(), Ok(&1), "{engine:?}");
            for x in [1, 2, 5, 6] {
                assert!(set.remove(&x), "{engine:?} remove({x})");
            }
            assert!(set.is_empty(), "{engine:?}");
        }
    }
}

#[test]
fn string_length_order() {
    for engine in Engine::ALL {
        let mut set = engine.create(by_key(|s: &&str| s.len()));
        for s in ["B", "AAA", "DD"] {
            assert!(set.insert(s));
        }
        assert_eq!(drain(&mut *set), ["B", "DD", "AAA"], "{engine:?}");
    }
}

#[test]
fn shuffled_thousand_round_trip() {
    init_logging();
    let values = shuffled(1..=1000, 1);
    for engine in Engine::ALL {
        let mut set = new_set(engine);
        for &x in &values {
            assert!(!set.contains(&x));
            assert!(set.insert(x));
            assert!(set.contains(&x));
        }
        for (i, &x) in values.iter().enumerate() {
            assert!(!set.is_empty(), "{engine:?} empty before removing {x}");
            assert!(set.contains(&x));
            assert!(set.remove(&x));
            assert!(!set.contains(&x));
            assert_eq!(set.len(), values.len() - i - 1);
        }
        assert!(set.is_empty());
    }
}

#[test]
fn distinct_random_numbers_come_out_sorted() {
    let mut rng = StdRng::seed_from_u64(1);
    let numbers: Vec<i32> = (0..1000).map(|_| rng.gen_range(1_000_000..99_999_999)).collect();
    let expected: Vec<i32> = numbers.iter().copied().collect::<StdBTreeSet<_>>().into_iter().collect();
    for engine in Engine::ALL {
        let mut set = new_set(engine);
        for &x in &numbers {
            set.insert(x);
        }
        assert_eq!(drain(&mut *set), expected, "{engine:?}");
    }
}

#[test]
fn every_earlier_insert_stays_visible() {
    let elements = shuffled(1..=100, 13);
    for engine in Engine::ALL {
        let mut set = new_set(engine);
        for (i, &element) in elements.iter().enumerate() {
            set.insert(element);
            for check in &elements[..=i] {
                assert!(set.contains(check), "{engine:?}: {check} after adding {i}-th element {element}");
            }
        }
    }
}

#[test]
fn add_remove_cycles() {
    for n in [3, 5, 10, 100] {
        let orders = [(1..=n).collect::<Vec<_>>(), (1..=n).rev().collect(), shuffled(1..=n, 1)];
        for elements in &orders {
            for engine in Engine::ALL {
                let mut set = new_set(engine);
                for iteration in 0..6 {
                    for &x in elements {
                        set.insert(x);
                    }
                    assert!(elements.iter().all(|x| set.contains(x)));
                    assert_eq!(set.first(), Ok(&1));
                    match iteration % 3 {
                        0 => elements.iter().for_each(|x| assert!(set.remove(x))),
                        1 => elements.iter().rev().for_each(|x| assert!(set.remove(x))),
                        _ => {
                            for _ in elements {
                                let first = *set.first().expect("non-empty");
                                assert!(set.remove(&first));
                            }
                        }
                    }
                    assert!(elements.iter().all(|x| !set.contains(x)));
                    assert!(set.is_empty());
                }
            }
        }
    }
}

#[test]
fn sequential_inserts_grow_btree_height() {
    let mut set = BTreeSet::new();
    let mut heights = vec![set.height()];
    for x in 1..=200 {
        set.insert(x);
        if heights.last() != Some(&set.height()) {
            heights.push(set.height());
        }
    }
    assert_eq!(heights, (1..=heights.len()).collect::<Vec<_>>());
    assert!(set.height() >= 3);

    for x in 1..=200 {
        let before = set.height();
        set.remove(&x);
        assert!(set.height() == before || set.height() + 1 == before);
    }
    assert_eq!(set.height(), 1);
}

#[test]
fn concrete_types_agree_with_the_trait() {
    let mut btree: BTreeSet<u8> = (0..=255).rev().collect();
    let mut wavl: WavlTreeSet<u8> = (0..=255).collect();
    assert_eq!(btree.len(), 256);
    assert_eq!(SortedSet::first(&btree), Ok(&0));
    assert_eq!(drain::<u8>(&mut btree), drain::<u8>(&mut wavl));
}

// ─── Randomized cross-engine checks ──────────────────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Contains(i64),
    First,
    PopFirst,
}

fn value_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => value_strategy().prop_map(SetOp::Insert),
        3 => value_strategy().prop_map(SetOp::Remove),
        2 => value_strategy().prop_map(SetOp::Contains),
        1 => Just(SetOp::First),
        1 => Just(SetOp::PopFirst),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Replays a random sequence of operations on both engines and on std's `BTreeSet`, and
    /// asserts identical results at every step.
    #[test]
    fn engines_match_std(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        let mut btree: BTreeSet<i64> = BTreeSet::new();
        let mut wavl: WavlTreeSet<i64> = WavlTreeSet::new();
        let mut model: StdBTreeSet<i64> = StdBTreeSet::new();

        for op in &ops {
            match *op {
                SetOp::Insert(v) => {
                    let expected = model.insert(v);
                    prop_assert_eq!(btree.insert(v), expected, "btree insert({})", v);
                    prop_assert_eq!(wavl.insert(v), expected, "wavl insert({})", v);
                }
                SetOp::Remove(v) => {
                    let expected = model.remove(&v);
                    prop_assert_eq!(btree.remove(&v), expected, "btree remove({})", v);
                    prop_assert_eq!(wavl.remove(&v), expected, "wavl remove({})", v);
                }
                SetOp::Contains(v) => {
                    let expected = model.contains(&v);
                    prop_assert_eq!(btree.contains(&v), expected, "btree contains({})", v);
                    prop_assert_eq!(wavl.contains(&v), expected, "wavl contains({})", v);
                }
                SetOp::First => {
                    let expected = model.first().ok_or(EmptySetError);
                    prop_assert_eq!(btree.first(), expected, "btree first()");
                    prop_assert_eq!(wavl.first(), expected, "wavl first()");
                }
                SetOp::PopFirst => {
                    if let Some(first) = model.pop_first() {
                        prop_assert!(btree.remove(&first));
                        prop_assert!(wavl.remove(&first));
                    }
                }
            }
            prop_assert_eq!(btree.len(), model.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(wavl.is_empty(), model.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Insertion order never changes the sorted contents.
    #[test]
    fn drain_is_sorted(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let expected: Vec<i64> = values.iter().copied().collect::<StdBTreeSet<_>>().into_iter().collect();
        for engine in Engine::ALL {
            let mut set = new_set(engine);
            for &v in &values {
                set.insert(v);
            }
            prop_assert_eq!(drain(&mut *set), expected.clone());
        }
    }

    /// Sets sharing a custom comparator agree with each other.
    #[test]
    fn descending_order_agrees(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let descending = |a: &i64, b: &i64| b.cmp(a);
        let mut btree = BTreeSet::with_comparator(descending);
        let mut wavl = WavlTreeSet::with_comparator(descending);
        for &v in &values {
            prop_assert_eq!(btree.insert(v), wavl.insert(v));
            prop_assert_eq!(btree.first(), wavl.first());
        }
        let max = values.iter().max();
        prop_assert_eq!(btree.first().ok(), max);
        prop_assert_eq!(drain::<i64>(&mut btree), drain::<i64>(&mut wavl));
    }
}
