/*
 * error.rs
 *
 * Exit codes are a contract. The child's own code (or the signal number
 * that killed it) passes through untouched; everything the supervisor
 * itself gets wrong lives in the 2-5 band so callers can tell "the child
 * failed" from "the supervisor failed".
 *
 * Don't change them. Scripts branch on these.
 */

use std::fmt;

/// Exit codes reserved for the supervisor itself. Child exit codes and
/// signal numbers pass through unchanged; the 2-5 band only appears when
/// the supervisor could not do its job.
pub mod exit_codes {
    /// Could not account for what happened to the child
    pub const INDETERMINATE: u8 = 2;
    /// Bad command line (duration, signal number, missing command)
    pub const USAGE: u8 = 3;
    /// Command could not be started
    pub const SPAWN: u8 = 4;
    /// The supervisor failed after the child started (signal delivery, poll)
    pub const SUPERVISOR: u8 = 5;
}

/* everything that can go wrong */
#[derive(Debug)]
pub enum SupervisorError {
    InvalidDuration(String),
    InvalidSignal(String),
    CommandNotFound(String),
    PermissionDenied(String),
    Spawn(i32),          // errno from posix_spawnp
    SignalDelivery(i32), // errno from kill, other than ESRCH
    WaitInconsistency,   // waitpid says no children, but we spawned one
    Internal(String),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration(s) => write!(f, "invalid duration: {s}"),
            Self::InvalidSignal(s) => write!(f, "invalid signal: {s}"),
            Self::CommandNotFound(s) => write!(f, "command not found: {s}"),
            Self::PermissionDenied(s) => write!(f, "permission denied: {s}"),
            Self::Spawn(errno) => write!(f, "failed to spawn process: errno {errno}"),
            Self::SignalDelivery(errno) => {
                write!(f, "failed to deliver signal: errno {errno}")
            }
            Self::WaitInconsistency => {
                write!(f, "wait reported no children although one was spawned")
            }
            Self::Internal(s) => write!(f, "internal error: {s}"),
        }
    }
}

impl SupervisorError {
    /* map errors to exit codes. 3 vs 4 vs 5 matters to scripts. */
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidDuration(_) | Self::InvalidSignal(_) => exit_codes::USAGE,
            Self::CommandNotFound(_) | Self::PermissionDenied(_) | Self::Spawn(_) => {
                exit_codes::SPAWN
            }
            Self::SignalDelivery(_) | Self::Internal(_) => exit_codes::SUPERVISOR,
            /* no reliable status is the sentinel, not a supervisor code */
            Self::WaitInconsistency => exit_codes::INDETERMINATE,
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
