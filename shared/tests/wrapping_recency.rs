/// PROPERTY-BASED TESTS: update id recency
///
/// Update and save ids wrap at 2^16, so "newer" is decided on the circle.
///
/// Key invariants:
/// 1. a is more recent than b exactly when (a - b) mod 2^16 is in 1..32768
/// 2. recency is antisymmetric away from the half-range point
/// 3. a run of increments is always seen as moving forward

use fathom_shared::{id_less_recent, id_more_recent, next_save_id, wrapping_diff};
use proptest::prelude::*;

#[test]
fn straddling_the_wrap() {
    assert!(id_more_recent(1, 65535));
    assert!(id_more_recent(0, 65535));
    assert!(!id_more_recent(65535, 1));
    assert!(id_less_recent(65535, 0));
}

#[test]
fn save_id_increment_never_lands_on_zero() {
    let mut id = 65534;
    id = next_save_id(id);
    assert_eq!(id, 65535);
    id = next_save_id(id);
    assert_eq!(id, 1);
}

proptest! {
    #[test]
    fn prop_matches_modular_definition(a in any::<u16>(), b in any::<u16>()) {
        let expected = a != b && u32::from(a.wrapping_sub(b)) < 32768;
        prop_assert_eq!(id_more_recent(a, b), expected);
    }

    #[test]
    fn prop_antisymmetric(a in any::<u16>(), b in any::<u16>()) {
        prop_assume!(a.wrapping_sub(b) != 32768);
        if a != b {
            prop_assert_ne!(id_more_recent(a, b), id_more_recent(b, a));
        } else {
            prop_assert!(!id_more_recent(a, b));
        }
    }

    #[test]
    fn prop_increments_move_forward(start in any::<u16>(), steps in 1u16..32768) {
        let end = start.wrapping_add(steps);
        prop_assert!(id_more_recent(end, start));
        prop_assert_eq!(i32::from(wrapping_diff(start, end)), i32::from(steps));
    }
}
