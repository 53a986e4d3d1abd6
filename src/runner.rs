/*
 * runner.rs
 *
 * Spawn child, watch clock, kill if needed. All the tricky bits live here.
 *
 * pidfd + timerfd + poll: we tell the kernel "wake me when the process
 * exits or the timer fires" and then sleep. Zero CPU while waiting, and
 * no signal handler anywhere - the old trick of letting SIGALRM interrupt
 * wait() depends on the handler being installed without SA_RESTART, and
 * one platform defaulting the other way makes the deadline silently
 * unenforceable. Two fds and one poll() have no such failure mode.
 *
 * The race: "child exited" and "deadline expired" arrive in whatever
 * order the kernel pleases, possibly both in the same poll() wake. The
 * child's exit always wins a tie - the signal is sent only when expiry
 * is observed strictly first, and a kill() that lands after the child
 * died on its own (ESRCH) is an expected outcome, not an error.
 */

use crate::deadline::DeadlineTimer;
use crate::error::{Result, SupervisorError, exit_codes};
use crate::process::{ChildProcess, RawWaitStatus, SpawnError, errno, spawn_command};

/* poll() can be cut short by any asynchronous event aimed at the
 * supervisor (EINTR) - those wakes are noise and we re-block. The cap
 * exists so a pathological signal storm degrades into a clean error
 * instead of an unbounded spin. */
const MAX_SPURIOUS_WAKES: u32 = 1024;

/* runtime config built from CLI args. immutable for the whole run. */
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub timeout_secs: u64, /* how long before we send the signal */
    pub signal: i32,       /* what to send (default: SIGTERM) */
    pub verbose: bool,     /* diagnostics to stderr */
}

/// What finally happened to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationResult {
    /// Exited on its own accord
    ExitedWithCode(i32),
    /// Terminated by a signal - ours or anyone else's
    KilledBySignal(i32),
    /// The reap produced nothing we can vouch for
    Indeterminate,
}

impl TerminationResult {
    /* raw wait status -> tagged outcome */
    fn from_status(status: RawWaitStatus) -> Self {
        if let Some(code) = status.code() {
            Self::ExitedWithCode(code)
        } else if let Some(sig) = status.signal() {
            Self::KilledBySignal(sig)
        } else {
            /* stopped/continued can't reach us (no WUNTRACED), but the
             * status word is the kernel's to fill - don't guess */
            Self::Indeterminate
        }
    }

    /// The process exit code this outcome translates to: the child's own
    /// code, the terminating signal's number, or the sentinel 2 when the
    /// outcome cannot be accounted for.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ExitedWithCode(code) => (code & 0xFF) as u8,
            Self::KilledBySignal(sig) => (sig & 0xFF) as u8,
            Self::Indeterminate => exit_codes::INDETERMINATE,
        }
    }
}

/* why poll() woke us up */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RaceOutcome {
    ChildFinishedFirst,
    DeadlineFinishedFirst,
    SpuriousWake,
}

/*
 * Classify a wake from the revents poll() filled in. Pure so the
 * decision table is testable without a kernel.
 *
 * Any event on the child fd counts as the child finishing: POLLIN is the
 * documented pidfd signal, POLLERR/POLLHUP would also only mean the
 * process is gone. Ties go to the child: a signal is only ever justified
 * by expiry being observed strictly before the exit.
 */
fn classify_wake(child_revents: libc::c_short, deadline_revents: libc::c_short) -> RaceOutcome {
    if child_revents != 0 {
        return RaceOutcome::ChildFinishedFirst;
    }
    if (deadline_revents & libc::POLLIN) != 0 {
        return RaceOutcome::DeadlineFinishedFirst;
    }
    RaceOutcome::SpuriousWake
}

/*
 * RAII wrapper for a pidfd. Becomes readable exactly once, when the
 * process exits; works on zombies too, so there is no gap between
 * "exited" and "reaped" where the fd lies to us.
 */
struct PidFd {
    fd: i32,
}

impl PidFd {
    #[allow(clippy::cast_possible_truncation)]
    fn open(pid: i32) -> std::result::Result<Self, i32> {
        // SAFETY: pidfd_open takes a pid and a flags word, no pointers
        let ret =
            unsafe { libc::syscall(libc::SYS_pidfd_open, pid as libc::c_long, 0 as libc::c_long) };
        if ret < 0 {
            return Err(errno());
        }
        Ok(Self { fd: ret as i32 })
    }

    #[inline]
    fn fd(&self) -> i32 {
        self.fd
    }
}

impl Drop for PidFd {
    fn drop(&mut self) {
        // SAFETY: fd was returned by pidfd_open and is only closed here
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// Spawn `command` and enforce the configured deadline on it.
///
/// Blocks until the child is reaped, one way or the other. At most one
/// signal is ever sent, exactly one reap happens, and the deadline timer
/// is dead by the time this returns.
///
/// # Errors
///
/// Command not found / not executable / spawn failure (nothing was
/// started), signal delivery failure other than "process already gone",
/// and `WaitInconsistency` when the reap denies the child ever existed.
pub fn run_command(command: &str, args: &[String], config: &RunConfig) -> Result<TerminationResult> {
    let mut child = spawn_command(command, args).map_err(|e| match e {
        SpawnError::NotFound(s) => SupervisorError::CommandNotFound(s),
        SpawnError::PermissionDenied(s) => SupervisorError::PermissionDenied(s),
        SpawnError::Spawn(no) | SpawnError::Wait(no) => SupervisorError::Spawn(no),
        SpawnError::InvalidArg => SupervisorError::Internal("invalid argument".to_string()),
    })?;
    let pid = child.id();

    if config.verbose {
        eprintln!(
            "supervisor: timeout {}s, signal {}, child pid {} running '{}'",
            config.timeout_secs,
            config.signal,
            pid,
            child.command_line()
        );
    }

    /* watch the child through a pidfd. if the kernel won't give us one
     * (fd exhaustion) we cannot supervise - reclaim the child rather
     * than leak it, then report */
    let pidfd = match PidFd::open(pid) {
        Ok(fd) => fd,
        Err(no) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SupervisorError::Internal(format!(
                "pidfd_open failed: errno {no}"
            )));
        }
    };

    let mut timer = match DeadlineTimer::arm(config.timeout_secs) {
        Ok(t) => t,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    };

    match wait_for_race(&pidfd, &timer)? {
        RaceOutcome::ChildFinishedFirst => {
            /* the timer may still be pending - kill it before it can
             * fire into some later poll */
            timer.disarm();
            finish(&mut child, config)
        }
        RaceOutcome::DeadlineFinishedFirst => {
            timer.drain();

            if config.verbose {
                eprintln!(
                    "supervisor: timed out - sending signal {} to pid {}",
                    config.signal, pid
                );
            }

            /* the one and only signal this run may send. ESRCH means the
             * child died in the window between expiry and kill - the
             * reap below still tells the true story */
            deliver_signal(pid, config.signal)?;

            let result = finish(&mut child, config);
            timer.disarm();
            result
        }
        RaceOutcome::SpuriousWake => {
            /* wait_for_race only returns this after exhausting the
             * retry cap */
            timer.disarm();
            Err(SupervisorError::Internal(
                "interrupted too many times while waiting".to_string(),
            ))
        }
    }
}

/*
 * Block until either fd reports, reclassifying after every wake.
 * EINTR and empty wakes are spurious: re-block, bounded by the cap.
 */
fn wait_for_race(pidfd: &PidFd, timer: &DeadlineTimer) -> Result<RaceOutcome> {
    let mut fds = [
        libc::pollfd {
            fd: pidfd.fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: timer.fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    let mut spurious: u32 = 0;
    loop {
        fds[0].revents = 0;
        fds[1].revents = 0;

        // SAFETY: fds is a valid array of two pollfds; -1 blocks with no
        // poll-level timeout (the timer fd carries the deadline)
        let n = unsafe { libc::poll(fds.as_mut_ptr(), 2, -1) };

        if n < 0 {
            let e = errno();
            if e != libc::EINTR {
                return Err(SupervisorError::Internal(format!(
                    "poll failed: errno {e}"
                )));
            }
            /* interrupted by something unrelated - not the child, not
             * the deadline. re-block. */
            spurious += 1;
        } else {
            match classify_wake(fds[0].revents, fds[1].revents) {
                RaceOutcome::SpuriousWake => spurious += 1,
                outcome => return Ok(outcome),
            }
        }

        if spurious >= MAX_SPURIOUS_WAKES {
            return Ok(RaceOutcome::SpuriousWake);
        }
    }
}

/* send the termination signal, tolerating a child that beat us to it */
fn deliver_signal(pid: i32, signum: i32) -> Result<()> {
    // SAFETY: kill is safe to call with any pid/signal combination
    let ret = unsafe { libc::kill(pid, signum) };
    if ret < 0 {
        let e = errno();
        if e == libc::ESRCH {
            /* already gone - the reap result takes precedence */
            return Ok(());
        }
        return Err(SupervisorError::SignalDelivery(e));
    }
    Ok(())
}

/* reap exactly once and translate. ECHILD with a child of our own on
 * the books is a lie we refuse to paper over. */
fn finish(child: &mut ChildProcess, config: &RunConfig) -> Result<TerminationResult> {
    let status = match child.wait() {
        Ok(status) => status,
        Err(SpawnError::Wait(e)) if e == libc::ECHILD => {
            return Err(SupervisorError::WaitInconsistency);
        }
        Err(e) => {
            return Err(SupervisorError::Internal(format!("wait failed: {e}")));
        }
    };

    if config.verbose {
        eprintln!(
            "supervisor: child pid {} raw status {:#06x}",
            child.id(),
            status.raw()
        );
    }

    Ok(TerminationResult::from_status(status))
}
