use harness_core::primitives::{
    has_minimal_difference, has_same_elements, has_same_elements_by, has_same_entries_by,
    print_array, print_collection, print_map,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn normal_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("normal", |x| x.is_normal())
}

fn normal_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("normal", |x| x.is_normal())
}

fn next_up_f64(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    }
}

fn next_up_f32(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() + 1)
    } else {
        f32::from_bits(x.to_bits() - 1)
    }
}

/// Below a negative power of two the spacing halves, so two steps toward zero
/// still fit in the ULP measured away from zero.
fn negative_power_of_two_f64(x: f64) -> bool {
    x < 0.0 && x.to_bits() & ((1u64 << 52) - 1) == 0
}

fn negative_power_of_two_f32(x: f32) -> bool {
    x < 0.0 && x.to_bits() & ((1u32 << 23) - 1) == 0
}

fn non_normal_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(-0.0),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(f64::NAN),
        (1u64..(1u64 << 52)).prop_map(f64::from_bits),
    ]
}

fn non_normal_f32() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(0.0f32),
        Just(f32::INFINITY),
        Just(f32::NAN),
        (1u32..(1u32 << 23)).prop_map(f32::from_bits),
    ]
}

proptest! {
    #[test]
    fn test_equal_values_match(a in normal_f64(), c in normal_f32()) {
        prop_assert!(has_minimal_difference(a, a));
        prop_assert!(has_minimal_difference(c, c));
    }

    #[test]
    fn test_one_increment_matches_f64(a in normal_f64()) {
        let b = next_up_f64(a);
        prop_assume!(b.is_normal());
        prop_assert!(has_minimal_difference(a, b));
    }

    #[test]
    fn test_one_increment_matches_f32(a in normal_f32()) {
        let b = next_up_f32(a);
        prop_assume!(b.is_normal());
        prop_assert!(has_minimal_difference(a, b));
    }

    #[test]
    fn test_two_increments_differ_f64(a in normal_f64()) {
        prop_assume!(!negative_power_of_two_f64(a));
        let b = next_up_f64(next_up_f64(a));
        prop_assume!(b.is_normal());
        prop_assert!(!has_minimal_difference(a, b));
    }

    #[test]
    fn test_two_increments_differ_f32(a in normal_f32()) {
        prop_assume!(!negative_power_of_two_f32(a));
        let b = next_up_f32(next_up_f32(a));
        prop_assume!(b.is_normal());
        prop_assert!(!has_minimal_difference(a, b));
    }

    #[test]
    fn test_non_normal_uses_plain_equality_f64(a in non_normal_f64(), b in any::<f64>(), swap in any::<bool>()) {
        let (a, b) = if swap { (b, a) } else { (a, b) };
        prop_assert_eq!(has_minimal_difference(a, b), a == b);
    }

    #[test]
    fn test_non_normal_uses_plain_equality_f32(a in non_normal_f32(), b in any::<f32>(), swap in any::<bool>()) {
        let (a, b) = if swap { (b, a) } else { (a, b) };
        prop_assert_eq!(has_minimal_difference(a, b), a == b);
    }

    #[test]
    fn test_same_elements_is_positional(
        seq1 in prop::collection::vec(-5i32..5, 0..16),
        seq2 in prop::collection::vec(-5i32..5, 0..16),
    ) {
        let length = seq1.len().min(seq2.len());
        let expected = (0..length).all(|i| seq1[i] == seq2[i]);
        prop_assert_eq!(has_same_elements(&seq1, &seq2, length), expected);
    }

    #[test]
    fn test_single_difference_fails(
        seq in prop::collection::vec(any::<i64>(), 1..32),
        at in any::<prop::sample::Index>(),
    ) {
        let position = at.index(seq.len());
        let mut other = seq.clone();
        other[position] = other[position].wrapping_add(1);

        prop_assert!(has_same_elements(&seq, &seq, seq.len()));
        prop_assert!(!has_same_elements(&seq, &other, seq.len()));
        prop_assert!(has_same_elements(&seq, &other, position));
    }
}

#[test]
fn test_same_elements_length_beyond_input() {
    assert!(!has_same_elements(&[1, 2], &[1, 2], 3));
    assert!(has_same_elements::<i32>(&[], &[], 0));
}

#[test]
fn test_same_elements_with_tolerant_elements() {
    let actual = [2.1f64 + 2.2, 1.0];
    let expected = [4.300000000000001f64, 1.0];
    assert!(has_same_elements_by(&actual, &expected, 2, |a, b| has_minimal_difference(*a, *b)));
    assert!(!has_same_elements_by(&[4.3f64], &[4.31f64], 1, |a, b| has_minimal_difference(*a, *b)));
}

#[test]
fn test_same_entries() {
    let map1 = BTreeMap::from([("a".to_string(), 1.0f64), ("b".to_string(), 2.0)]);
    let same = map1.clone();
    let missing = BTreeMap::from([("a".to_string(), 1.0f64)]);
    let moved = BTreeMap::from([("a".to_string(), 1.0f64), ("c".to_string(), 2.0)]);

    let eq = |a: &f64, b: &f64| has_minimal_difference(*a, *b);
    assert!(has_same_entries_by(&map1, &same, eq));
    assert!(!has_same_entries_by(&map1, &missing, eq));
    assert!(!has_same_entries_by(&map1, &moved, eq));
}

#[test]
fn test_rendering() {
    assert_eq!(print_array::<i32>(&[]), "{  }");
    assert_eq!(print_array(&[1, 2, 3]), "{ 1, 2, 3 }");
    assert_eq!(print_collection(&BTreeSet::from([3i64, 1])), "{ 1, 3 }");
    assert_eq!(
        print_map(&BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)])),
        "{ a: 1, b: 2 }"
    );
    assert_eq!(
        print_array(&[vec![true], vec![]]),
        "{ { true }, {  } }"
    );
}
