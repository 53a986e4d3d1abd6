/*
 * duration.rs
 *
 * Parse "45", "2m", "3h", "4d" into whole seconds. No suffix means
 * seconds. Case insensitive. Zero and negative are rejected - a deadline
 * of nothing is a usage error, not "run forever".
 *
 * Integer math only, checked multiply. "2m" must be exactly 120, never
 * 119.999-something.
 */

use crate::error::{Result, SupervisorError};

/* unit letter -> seconds. the whole table. */
const UNITS: [(char, u64); 4] = [('s', 1), ('m', 60), ('h', 3600), ('d', 86400)];

/// Parse a deadline string into a strictly positive second count.
///
/// # Examples
///
/// ```
/// use supervisor::duration::eval_duration;
///
/// assert_eq!(eval_duration("45").unwrap(), 45);
/// assert_eq!(eval_duration("2m").unwrap(), 120);
/// assert_eq!(eval_duration("3h").unwrap(), 10800);
/// assert_eq!(eval_duration("4d").unwrap(), 345600);
/// assert!(eval_duration("0").is_err());
/// ```
///
/// # Errors
///
/// `InvalidDuration` when the numeric prefix is missing or zero, the
/// trailing character is not a known unit letter, anything follows the
/// unit, or the multiplied value does not fit in `u64`.
pub fn eval_duration(input: &str) -> Result<u64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(SupervisorError::InvalidDuration("empty duration".into()));
    }

    let (num_str, suffix) = split_number_and_suffix(input);

    if num_str.is_empty() {
        return Err(SupervisorError::InvalidDuration(format!(
            "no numeric value in '{input}'"
        )));
    }

    /* a leading '-' lands in num_str and fails the u64 parse, which is
     * exactly the rejection we want for negative values */
    let value: u64 = num_str.parse().map_err(|_| {
        SupervisorError::InvalidDuration(format!("invalid number '{num_str}'"))
    })?;

    if value == 0 {
        return Err(SupervisorError::InvalidDuration(
            "positive number required".into(),
        ));
    }

    let multiplier = match suffix_multiplier(suffix) {
        Some(m) => m,
        None => {
            return Err(SupervisorError::InvalidDuration(format!(
                "invalid unit '{suffix}' (s seconds, m minutes, h hours, d days)"
            )));
        }
    };

    value.checked_mul(multiplier).ok_or_else(|| {
        SupervisorError::InvalidDuration(format!("'{input}' is too large"))
    })
}

/* find where the number ends and the unit begins */
fn split_number_and_suffix(input: &str) -> (&str, &str) {
    let suffix_start = input
        .find(|c: char| !c.is_ascii_digit() && c != '-')
        .unwrap_or(input.len());

    (&input[..suffix_start], &input[suffix_start..])
}

/* one unit letter at most, case folded */
fn suffix_multiplier(suffix: &str) -> Option<u64> {
    let mut chars = suffix.chars();
    match chars.next() {
        None => Some(1), /* bare number = seconds */
        Some(letter) if chars.next().is_none() => {
            let letter = letter.to_ascii_lowercase();
            UNITS.iter().find(|(l, _)| *l == letter).map(|(_, m)| *m)
        }
        Some(_) => None, /* "10ms", "5sec" - more than one trailing char */
    }
}
