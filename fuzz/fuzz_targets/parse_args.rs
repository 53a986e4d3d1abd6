/*
 * fuzz_targets/parse_args.rs
 *
 * fuzz target for CLI argument parsing. validates that try_parse_from
 * never panics on arbitrary argument combinations.
 *
 * edge cases: "-tv", "--unknown", "-s" (missing value), very long args,
 * embedded values (-t5m), hyphen-leading commands
 */

#![no_main]

use clap::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    /* split input on null bytes to simulate multiple arguments */
    let mut args: Vec<String> = data
        .split(|&b| b == 0)
        .filter_map(|chunk| core::str::from_utf8(chunk).ok())
        .filter(|s| !s.is_empty()) /* filter out empty strings from multiple nulls */
        .map(String::from)
        .collect();

    /* skip if any arg is exactly -V, --version, -h, or --help.
     * these call exit(0) which fuzzer treats as crash. this is expected behavior. */
    for arg in &args {
        if arg == "-V" || arg == "--version" || arg == "-h" || arg == "--help" {
            return;
        }
    }

    args.insert(0, String::from("supervisor"));

    /* try_parse_from must not panic on any argument combination */
    let _ = supervisor::args::Args::try_parse_from(&args);
});
