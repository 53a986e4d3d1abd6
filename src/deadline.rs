/*
 * deadline.rs
 *
 * The deadline is a one-shot CLOCK_MONOTONIC timerfd. When it expires the
 * fd becomes readable and poll() wakes up - that is the entire payload.
 * No interval, no signal handler, no dependency on syscall restart
 * semantics: the race between "child exited" and "time ran out" is
 * decided by which fd poll reports first.
 *
 * disarm() zeroes the timer and may be called in any state: pending,
 * already fired, or already disarmed. Drop closes the fd, so a timer
 * can never outlive the wait that armed it.
 */

use crate::error::{Result, SupervisorError};
use crate::process::errno;

/// One-shot wall-clock deadline, armed at spawn time.
#[derive(Debug)]
pub struct DeadlineTimer {
    fd: i32,
}

impl DeadlineTimer {
    /// Create and arm a timer that fires once, `seconds` from now.
    ///
    /// # Errors
    ///
    /// `Internal` if timerfd creation or arming fails (fd exhaustion).
    pub fn arm(seconds: u64) -> Result<Self> {
        // SAFETY: timerfd_create has no pointer arguments; flags are valid
        let fd = unsafe { libc::timerfd_create(libc::CLOCK_MONOTONIC, libc::TFD_CLOEXEC) };
        if fd < 0 {
            return Err(SupervisorError::Internal(format!(
                "timerfd_create failed: errno {}",
                errno()
            )));
        }

        let timer = Self { fd };
        timer.settime(seconds)?;
        Ok(timer)
    }

    /// Cancel a pending expiration. Idempotent; a timer that already
    /// fired or was already disarmed is left exactly as it is - in
    /// particular this can never cause a second wake-up.
    pub fn disarm(&mut self) {
        /* zero it_value = disarmed. errors are unreachable for a live fd
         * and the fd is closed on drop anyway */
        let _ = self.settime(0);
    }

    /// The pollable fd; readable once the deadline has expired.
    #[inline]
    #[must_use]
    pub fn fd(&self) -> i32 {
        self.fd
    }

    /// Consume the expiration count after a fire so the fd stops
    /// reading as ready. The count itself is meaningless for a
    /// one-shot timer and is discarded.
    pub fn drain(&self) {
        let mut expirations: u64 = 0;
        // SAFETY: fd is a live timerfd; an 8-byte buffer is what
        // timerfd reads require. A failed read leaves nothing to undo.
        unsafe {
            libc::read(
                self.fd,
                (&raw mut expirations).cast(),
                core::mem::size_of::<u64>(),
            );
        }
    }

    /* seconds == 0 disarms, anything else arms a single expiration */
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn settime(&self, seconds: u64) -> Result<()> {
        /* clamp instead of wrapping: a deadline past the year 292 billion
         * behaves like "never", which is what the caller meant */
        let tv_sec = seconds.min(libc::time_t::MAX as u64) as libc::time_t;
        let new_value = libc::itimerspec {
            it_interval: libc::timespec {
                tv_sec: 0,
                tv_nsec: 0,
            },
            it_value: libc::timespec { tv_sec, tv_nsec: 0 },
        };

        // SAFETY: fd is a live timerfd, new_value is a valid itimerspec,
        // old_value may be null per timerfd_settime(2)
        let ret = unsafe { libc::timerfd_settime(self.fd, 0, &new_value, core::ptr::null_mut()) };
        if ret < 0 {
            return Err(SupervisorError::Internal(format!(
                "timerfd_settime failed: errno {}",
                errno()
            )));
        }
        Ok(())
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        // SAFETY: fd was returned by timerfd_create and is only closed here
        unsafe {
            libc::close(self.fd);
        }
    }
}

#[cfg(test)]
#[cfg(not(miri))]
mod tests {
    use super::*;

    /* poll the timer fd with a zero timeout: has it fired? */
    fn fired(timer: &DeadlineTimer) -> bool {
        let mut pfd = libc::pollfd {
            fd: timer.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: pfd is a valid pollfd array of length 1
        let n = unsafe { libc::poll(&raw mut pfd, 1, 0) };
        n > 0 && (pfd.revents & libc::POLLIN) != 0
    }

    #[test]
    fn test_armed_timer_is_pending() {
        let timer = DeadlineTimer::arm(1000).unwrap();
        assert!(!fired(&timer));
    }

    #[test]
    fn test_disarm_cancels_pending_fire() {
        let mut timer = DeadlineTimer::arm(1000).unwrap();
        timer.disarm();
        assert!(!fired(&timer));
    }

    #[test]
    fn test_disarm_is_idempotent() {
        let mut timer = DeadlineTimer::arm(1000).unwrap();
        timer.disarm();
        timer.disarm();
        timer.disarm();
        assert!(!fired(&timer));
    }

    #[test]
    fn test_disarm_after_fire_changes_nothing() {
        /* 1-second granularity means a "fire now" test needs a real
         * second; use the blocking-poll variant instead */
        let mut timer = DeadlineTimer::arm(1).unwrap();
        let mut pfd = libc::pollfd {
            fd: timer.fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: pfd is a valid pollfd array of length 1; 2000ms cap
        let n = unsafe { libc::poll(&raw mut pfd, 1, 2000) };
        assert!(n > 0, "one-shot timer should fire within its deadline");

        timer.drain();
        timer.disarm();
        assert!(!fired(&timer), "disarm after fire must not re-arm");
    }
}
