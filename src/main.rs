/*
 * main.rs
 *
 * Parse args, validate, call runner, translate the outcome. Boring on
 * purpose. The interesting stuff is in runner.rs.
 *
 * Clap's own error exit code (2) would collide with the indeterminate
 * sentinel, so parse failures are caught and re-reported as usage
 * errors instead of letting clap exit for us.
 */

use clap::Parser;

use supervisor::args::Args;
use supervisor::duration::eval_duration;
use supervisor::error::exit_codes;
use supervisor::runner::{RunConfig, run_command};
use supervisor::signal::validate_signal;

fn main() {
    std::process::exit(i32::from(run_main()));
}

fn run_main() -> u8 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            /* help and version are successful exits, not usage errors */
            if e.use_stderr() {
                eprintln!("{e}");
                return exit_codes::USAGE;
            }
            print!("{e}");
            return 0;
        }
    };

    if let Some(shell) = args.completions {
        Args::print_completions(shell);
        return 0;
    }

    /* both are Some once clap is happy; the unwrap-by-match keeps the
     * diagnostics in our own voice if that ever changes */
    let (Some(timeout_str), Some(command)) = (&args.timeout, &args.command) else {
        eprintln!("supervisor: missing duration or command");
        return exit_codes::USAGE;
    };

    /* validate everything before anything is spawned */
    let timeout_secs = match eval_duration(timeout_str) {
        Ok(secs) => secs,
        Err(e) => {
            eprintln!("supervisor: {e}");
            return e.exit_code();
        }
    };

    let signal = match validate_signal(args.signal) {
        Ok(signum) => signum,
        Err(e) => {
            eprintln!("supervisor: {e}");
            return e.exit_code();
        }
    };

    let config = RunConfig {
        timeout_secs,
        signal,
        verbose: args.verbose,
    };

    match run_command(command, &args.args, &config) {
        Ok(result) => result.exit_code(),
        Err(e) => {
            eprintln!("supervisor: {e}");
            e.exit_code()
        }
    }
}
