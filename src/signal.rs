/*
 * signal.rs
 *
 * Validate the termination signal number. Numbers only - this mirrors
 * kill(1) usage like `-s 9`. Anything from 1 up to (but not including)
 * the first real-time signal is allowed; the real-time range is reserved
 * for runtimes and we refuse to aim a deadline at it.
 */

use crate::error::{Result, SupervisorError};

/// The signal delivered on deadline expiry when no override is given.
pub const DEFAULT_SIGNAL: i32 = libc::SIGTERM;

/* first signal number we refuse. SIGRTMIN where the platform has a
 * real-time class; 32 as the conventional ceiling where it doesn't. */
#[cfg(target_os = "linux")]
fn signal_ceiling() -> i32 {
    libc::SIGRTMIN()
}

#[cfg(not(target_os = "linux"))]
fn signal_ceiling() -> i32 {
    32
}

/// Validate an optional signal-number override, applying the default.
///
/// # Examples
///
/// ```
/// use supervisor::signal::{validate_signal, DEFAULT_SIGNAL};
///
/// assert_eq!(validate_signal(None).unwrap(), DEFAULT_SIGNAL);
/// assert_eq!(validate_signal(Some(9)).unwrap(), 9);
/// assert!(validate_signal(Some(0)).is_err());
/// ```
///
/// # Errors
///
/// `InvalidSignal` when the number is zero, negative, or at/above the
/// platform's real-time signal range.
pub fn validate_signal(requested: Option<i32>) -> Result<i32> {
    let signum = requested.unwrap_or(DEFAULT_SIGNAL);
    let ceiling = signal_ceiling();

    if signum <= 0 || signum >= ceiling {
        return Err(SupervisorError::InvalidSignal(format!(
            "{signum} (signal number must be between 1 and {})",
            ceiling - 1
        )));
    }

    Ok(signum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sigterm() {
        assert_eq!(validate_signal(None).unwrap(), libc::SIGTERM);
    }

    #[test]
    fn test_accepts_classic_signals() {
        assert_eq!(validate_signal(Some(libc::SIGHUP)).unwrap(), 1);
        assert_eq!(validate_signal(Some(libc::SIGINT)).unwrap(), 2);
        assert_eq!(validate_signal(Some(libc::SIGKILL)).unwrap(), 9);
        assert_eq!(validate_signal(Some(libc::SIGTERM)).unwrap(), 15);
    }

    #[test]
    fn test_accepts_entire_legal_range() {
        for n in 1..signal_ceiling() {
            assert!(validate_signal(Some(n)).is_ok(), "signal {n} should pass");
        }
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(validate_signal(Some(0)).is_err());
        assert!(validate_signal(Some(-1)).is_err());
        assert!(validate_signal(Some(i32::MIN)).is_err());
    }

    #[test]
    fn test_rejects_ceiling_and_above() {
        let ceiling = signal_ceiling();
        assert!(validate_signal(Some(ceiling)).is_err());
        assert!(validate_signal(Some(ceiling + 1)).is_err());
        assert!(validate_signal(Some(999)).is_err());
    }

    #[test]
    fn test_error_names_the_legal_range() {
        let err = validate_signal(Some(0)).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("between 1 and"), "got: {msg}");
    }
}
