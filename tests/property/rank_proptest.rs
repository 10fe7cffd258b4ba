//! Property-based tests for rank keys
//!
//! Uses proptest to generate random valid keys and verify the ordering
//! invariants hold across the whole key space, not just hand-picked cases.

use flowdeck::shared::policy;
use flowdeck::shared::rank::RankKey;
use proptest::prelude::*;

/// Strategy for valid rank keys: 1 to 8 base-26 digits, no trailing zero
fn rank_key() -> impl Strategy<Value = RankKey> {
    (prop::collection::vec(0u8..26, 0..7), 1u8..26).prop_map(|(mut digits, last)| {
        digits.push(last);
        let raw: String = digits.iter().map(|d| (b'a' + d) as char).collect();
        RankKey::new(raw).unwrap()
    })
}

proptest! {
    #[test]
    fn test_between_is_strictly_inside(a in rank_key(), b in rank_key()) {
        prop_assume!(a != b);
        let (lower, upper) = if a < b { (a, b) } else { (b, a) };
        let mid = RankKey::between(&lower, &upper).unwrap();
        prop_assert!(lower < mid, "{} !< {}", lower, mid);
        prop_assert!(mid < upper, "{} !< {}", mid, upper);
        // The result is itself a valid key
        prop_assert!(RankKey::new(mid.as_str()).is_ok());
    }

    #[test]
    fn test_next_is_strictly_greater(k in rank_key()) {
        let next = k.next();
        prop_assert!(k < next);
        prop_assert!(RankKey::new(next.as_str()).is_ok());
    }

    #[test]
    fn test_prev_is_strictly_smaller(k in rank_key()) {
        let prev = k.prev();
        prop_assert!(prev < k);
        prop_assert!(RankKey::new(prev.as_str()).is_ok());
    }

    #[test]
    fn test_misordered_between_is_rejected(a in rank_key(), b in rank_key()) {
        prop_assume!(a != b);
        let (lower, upper) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(RankKey::between(&upper, &lower).is_err());
        prop_assert!(RankKey::between(&lower, &lower).is_err());
    }

    #[test]
    fn test_repeated_appends_are_increasing(count in 1usize..128) {
        let mut last: Option<RankKey> = None;
        for _ in 0..count {
            let key = policy::append_key(last.as_ref());
            if let Some(prev) = &last {
                prop_assert!(prev < &key);
            }
            last = Some(key);
        }
    }

    #[test]
    fn test_insert_at_head_is_smallest(keys in prop::collection::btree_set(rank_key(), 1..12)) {
        let keys: Vec<RankKey> = keys.into_iter().collect();
        let head = policy::insert_key(&keys, 0).unwrap();
        prop_assert!(head < keys[0]);
    }

    #[test]
    fn test_serde_roundtrip(k in rank_key()) {
        let json = serde_json::to_string(&k).unwrap();
        let back: RankKey = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(k, back);
    }
}

/// Repeated midpoint insertion at the same boundary keeps producing valid,
/// strictly ordered keys while the precision grows
#[test]
fn test_between_converges_without_exhaustion() {
    let mut lower = RankKey::min();
    let mut upper = RankKey::max();
    for i in 0..128 {
        let mid = RankKey::between(&lower, &upper).unwrap();
        assert!(lower < mid && mid < upper, "step {}: {} {} {}", i, lower, mid, upper);
        if i % 2 == 0 {
            lower = mid;
        } else {
            upper = mid;
        }
    }
}
