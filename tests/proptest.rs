/*
 * proptest.rs
 *
 * property-based tests for the validation functions.
 * generates thousands of inputs to find edge cases.
 */

use proptest::prelude::*;

use supervisor::duration::eval_duration;
use supervisor::signal::validate_signal;

/* ============================================================================
 * Duration Evaluation Properties
 * ============================================================================ */

/* valid duration strings always evaluate to n * multiplier */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn duration_valid_seconds(secs in 1u64..1_000_000) {
        let s = format!("{}s", secs);
        prop_assert_eq!(eval_duration(&s).unwrap(), secs);
    }

    #[test]
    fn duration_valid_minutes(mins in 1u64..10_000) {
        let s = format!("{}m", mins);
        prop_assert_eq!(eval_duration(&s).unwrap(), mins * 60);
    }

    #[test]
    fn duration_valid_hours(hours in 1u64..1000) {
        let s = format!("{}h", hours);
        prop_assert_eq!(eval_duration(&s).unwrap(), hours * 3600);
    }

    #[test]
    fn duration_valid_days(days in 1u64..100) {
        let s = format!("{}d", days);
        prop_assert_eq!(eval_duration(&s).unwrap(), days * 86400);
    }

    #[test]
    fn duration_no_suffix_means_seconds(secs in 1u64..1_000_000) {
        prop_assert_eq!(eval_duration(&secs.to_string()).unwrap(), secs);
    }
}

/* unit letters are case insensitive */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn duration_case_insensitive(secs in 1u64..1000, upper in prop::bool::ANY) {
        let lower = format!("{}m", secs);
        let s = if upper { lower.to_uppercase() } else { lower };
        prop_assert_eq!(eval_duration(&s).unwrap(), secs * 60);
    }
}

/* whitespace around the value is ignored */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn duration_whitespace_ignored(secs in 1u64..1000, spaces in 0usize..5) {
        let pad = " ".repeat(spaces);
        let s = format!("{pad}{secs}s{pad}");
        prop_assert_eq!(eval_duration(&s).unwrap(), secs);
    }
}

/* zero never passes, whatever the unit */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn duration_zero_always_rejected(unit in prop::sample::select(vec!["", "s", "m", "h", "d"])) {
        let s = format!("0{unit}");
        prop_assert!(eval_duration(&s).is_err());
    }
}

/* invalid suffixes always error */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn duration_invalid_suffix_errors(
        num in 1u64..1000,
        suffix in "[a-z&&[^smhd]]{1,3}"
    ) {
        let s = format!("{}{}", num, suffix);
        prop_assert!(eval_duration(&s).is_err());
    }
}

/* multiplication that would not fit in u64 is rejected, never wrapped */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn duration_overflow_rejected(days in (u64::MAX / 86400 + 1)..u64::MAX / 2) {
        let s = format!("{}d", days);
        prop_assert!(eval_duration(&s).is_err());
    }
}

/* evaluation is total: arbitrary junk never panics */
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn duration_never_panics(input in "\\PC{0,40}") {
        let _ = eval_duration(&input);
    }
}

/* ============================================================================
 * Signal Validation Properties
 * ============================================================================ */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn signal_classic_range_accepted(n in 1i32..32) {
        /* everything below any platform's real-time range is legal */
        prop_assert_eq!(validate_signal(Some(n)).unwrap(), n);
    }

    #[test]
    fn signal_nonpositive_rejected(n in i32::MIN..=0) {
        prop_assert!(validate_signal(Some(n)).is_err());
    }

    #[test]
    fn signal_at_or_above_ceiling_rejected(n in 64i32..10_000) {
        /* 64 is above SIGRTMIN on every libc we target */
        prop_assert!(validate_signal(Some(n)).is_err());
    }
}
