/*
 * fuzz_targets/eval_duration.rs
 *
 * fuzz target for duration evaluation. validates that eval_duration never
 * panics on arbitrary input, only returns Ok or Err gracefully.
 *
 * edge cases: "", "99999999999999999999d", "-1", "1..2s", unicode, huge numbers
 */

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    /* convert to str - invalid UTF-8 should be handled gracefully */
    if let Ok(s) = core::str::from_utf8(data) {
        /* eval_duration must not panic on any valid UTF-8 string */
        let _ = supervisor::duration::eval_duration(s);
    }
});
