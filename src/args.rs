/*
 * args.rs
 *
 * Clap derive macros handle parsing. Life's too short to do this by hand.
 *
 * trailing_var_arg grabs everything after COMMAND so
 * `supervisor -t 5m grep -r foo .` doesn't try to parse grep's flags.
 *
 * Note the deliberate absence of a default for --timeout: running a
 * command with no deadline is what a shell is for.
 */

use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;
use std::io;

#[derive(Parser, Debug)]
#[command(
    name = "supervisor",
    version,
    about = "Run a command with a wall-clock deadline",
    long_about = "Start COMMAND and deliver a signal to it if it is still running\n\
                  after DURATION.\n\n\
                  DURATION is a whole number with an optional unit letter:\n\
                  's' for seconds (default), 'm' for minutes, 'h' for hours, 'd' for days.\n\n\
                  Examples:\n\
                    supervisor -t 30 cmd       # 30 seconds\n\
                    supervisor -t 2m cmd       # 2 minutes (120 seconds)\n\
                    supervisor -t 3h cmd       # 3 hours\n\n\
                  If no signal is specified, SIGTERM (15) is sent.",
    after_help = "Exit status:\n\
                  the exit status of COMMAND when it exits on its own\n\
                  the signal number when COMMAND is terminated by a signal\n\
                  2 if the outcome could not be determined\n\
                  3 for a usage error (bad duration or signal number)\n\
                  4 if COMMAND could not be started\n\
                  5 if the supervisor itself failed after starting COMMAND"
)]
pub struct Args {
    /// Deadline before the signal is sent.
    ///
    /// A whole number with optional unit letter: 's' seconds (default),
    /// 'm' minutes, 'h' hours, 'd' days. Must be positive.
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "DURATION",
        allow_hyphen_values = true,
        required_unless_present = "completions"
    )]
    pub timeout: Option<String>,

    /// Signal number to deliver on timeout (default: 15, SIGTERM).
    ///
    /// Falls back to the SUPERVISOR_SIGNAL environment variable.
    #[arg(
        short = 's',
        long = "signal",
        value_name = "N",
        allow_negative_numbers = true,
        env = "SUPERVISOR_SIGNAL"
    )]
    pub signal: Option<i32>,

    /// Diagnose the resolved deadline, signal, child pid, and final raw
    /// status to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Generate shell completions and exit.
    ///
    /// Outputs completion script for the specified shell to stdout.
    /// Supported: bash, zsh, fish, powershell, elvish.
    #[arg(long = "completions", value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Command to run.
    #[arg(value_name = "COMMAND", allow_hyphen_values = true, required_unless_present = "completions")]
    pub command: Option<String>,

    /// Arguments for the command.
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARG"
    )]
    pub args: Vec<String>,
}

impl Args {
    /// generate shell completions to stdout
    pub fn print_completions(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "supervisor", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_args() {
        let args = Args::try_parse_from(["supervisor", "-t", "5", "sleep", "10"]).unwrap();
        assert_eq!(args.timeout, Some("5".to_string()));
        assert_eq!(args.command, Some("sleep".to_string()));
        assert_eq!(args.args, vec!["10"]);
        assert_eq!(args.signal, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "supervisor",
            "--timeout=2m",
            "--signal=9",
            "--verbose",
            "my_command",
            "arg1",
            "arg2",
        ])
        .unwrap();

        assert_eq!(args.timeout, Some("2m".to_string()));
        assert_eq!(args.signal, Some(9));
        assert!(args.verbose);
        assert_eq!(args.command, Some("my_command".to_string()));
        assert_eq!(args.args, vec!["arg1", "arg2"]);
    }

    #[test]
    fn test_timeout_is_required() {
        let result = Args::try_parse_from(["supervisor", "sleep", "10"]);
        assert!(result.is_err(), "--timeout must be mandatory");
    }

    #[test]
    fn test_command_is_required() {
        let result = Args::try_parse_from(["supervisor", "-t", "5"]);
        assert!(result.is_err(), "a command must be given");
    }

    #[test]
    fn test_negative_signal_reaches_validation() {
        /* clap hands the value through; rejection is the signal policy's
         * job so the diagnostic names the legal range */
        let args = Args::try_parse_from(["supervisor", "-t", "5", "-s", "-1", "cmd"]).unwrap();
        assert_eq!(args.signal, Some(-1));
    }

    #[test]
    fn test_command_flags_pass_through() {
        let args =
            Args::try_parse_from(["supervisor", "-t", "5", "grep", "-r", "needle"]).unwrap();
        assert_eq!(args.command, Some("grep".to_string()));
        assert_eq!(args.args, vec!["-r", "needle"]);
    }

    #[test]
    fn test_command_with_leading_dash() {
        let args = Args::try_parse_from(["supervisor", "-t", "5", "--", "-weird"]).unwrap();
        assert_eq!(args.command, Some("-weird".to_string()));
    }

    #[test]
    fn test_completions_without_command() {
        let args = Args::try_parse_from(["supervisor", "--completions", "bash"]).unwrap();
        assert!(args.completions.is_some());
        assert!(args.timeout.is_none());
    }
}
