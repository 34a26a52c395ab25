//! Property-based tests for the key-arithmetic engine.

use proptest::prelude::*;

use lexikey::ThreadRandom;
use lexikey::base62;
use lexikey::generate_jittered_key_between_with;
use lexikey::generate_key_between;
use lexikey::generate_n_keys_between;
use lexikey::head;

// =============================================================================
// Test helpers
// =============================================================================

/// Build a list by repeatedly inserting at pseudo-random positions with the
/// plain generator, starting from an empty list. Every produced key is a
/// valid bound for later operations.
fn build_list(positions: &[usize]) -> Vec<String> {
    let cs = base62();
    let mut list: Vec<String> = Vec::new();
    for &pos in positions {
        let at = if list.is_empty() { 0 } else { pos % (list.len() + 1) };
        let lower = at.checked_sub(1).map(|i| list[i].clone());
        let upper = list.get(at).cloned();
        let key = generate_key_between(lower.as_deref(), upper.as_deref(), cs).unwrap();
        list.insert(at, key);
    }
    return list;
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Inserting anywhere keeps the list strictly sorted with no
    /// duplicates: the generated key always lands strictly between its
    /// bounds.
    #[test]
    fn random_insertions_keep_the_list_sorted(positions in prop::collection::vec(0usize..1000, 1..120)) {
        let list = build_list(&positions);
        prop_assert_eq!(list.len(), positions.len());
        for pair in list.windows(2) {
            prop_assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    /// Same property under jitter, with real random offsets.
    #[test]
    fn jittered_insertions_keep_the_list_sorted(positions in prop::collection::vec(0usize..1000, 1..80)) {
        let cs = base62();
        let mut list: Vec<String> = Vec::new();
        for pos in positions {
            let at = if list.is_empty() { 0 } else { pos % (list.len() + 1) };
            let lower = at.checked_sub(1).map(|i| list[i].clone());
            let upper = list.get(at).cloned();
            let key = generate_jittered_key_between_with(
                lower.as_deref(),
                upper.as_deref(),
                cs,
                &mut ThreadRandom,
            )
            .unwrap();
            list.insert(at, key);
        }
        for pair in list.windows(2) {
            prop_assert!(pair[0] < pair[1], "{:?} !< {:?}", pair[0], pair[1]);
        }
    }

    /// Bulk generation yields exactly n keys, strictly increasing, all
    /// inside the open interval.
    #[test]
    fn n_keys_land_strictly_between(positions in prop::collection::vec(0usize..1000, 2..40), n in 0usize..50) {
        let cs = base62();
        let list = build_list(&positions);
        let lower = &list[0];
        let upper = &list[list.len() - 1];
        prop_assume!(lower < upper);
        let keys = generate_n_keys_between(Some(lower), Some(upper), n, cs).unwrap();
        prop_assert_eq!(keys.len(), n);
        let mut previous = lower.clone();
        for key in &keys {
            prop_assert!(&previous < key);
            previous = key.clone();
        }
        prop_assert!(&previous < upper);
    }

    /// Stepping a magnitude up and back down (or down and back up) is the
    /// identity on well-formed integers.
    #[test]
    fn integer_step_round_trip(positions in prop::collection::vec(0usize..1000, 1..60)) {
        let cs = base62();
        for key in build_list(&positions) {
            let integer = head::get_integer_part(&key, cs).unwrap();
            let up = head::increment_integer(&integer, cs).unwrap();
            prop_assert_eq!(head::decrement_integer(&up, cs).unwrap(), integer.clone());
            let down = head::decrement_integer(&integer, cs).unwrap();
            prop_assert_eq!(head::increment_integer(&down, cs).unwrap(), integer);
        }
    }
}

// =============================================================================
// Fixed stress cases
// =============================================================================

#[test]
fn thousand_insertions_at_one_slot() {
    let cs = base62();
    let mut list = vec!["a0".to_string(), "a1".to_string()];
    for _ in 0..1000 {
        let key = generate_key_between(Some(list[0].as_str()), Some(list[1].as_str()), cs).unwrap();
        assert!(list[0] < key && key < list[1]);
        list.insert(1, key);
    }
    assert_eq!(list.len(), 1002);
    for pair in list.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    let mut deduped = list.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), list.len());
}

#[test]
fn thousand_appends_stay_short() {
    let cs = base62();
    let mut last = generate_key_between(None, None, cs).unwrap();
    for _ in 0..1000 {
        let next = generate_key_between(Some(last.as_str()), None, cs).unwrap();
        assert!(last < next);
        last = next;
    }
    // 1000 appends in base62 only ever need a 3-character magnitude.
    assert!(last.chars().count() <= 3, "{last:?} grew too long");
}
