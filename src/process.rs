/*
 * process.rs
 *
 * Child spawning and reaping via posix_spawnp. The child inherits our
 * stdio, environment, and working directory untouched - the supervisor
 * never intercepts anything the child reads or writes.
 *
 * posix_spawnp beats fork+exec on modern systems (vfork path, no page
 * table copy) and, on glibc, reports exec failure back to the caller and
 * reaps the dead half-started child itself. No zombie on ENOENT.
 */

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

unsafe extern "C" {
    /* environ is a global variable pointing to the environment */
    static environ: *const *const c_char;
}

/// Error from process operations
#[derive(Debug)]
pub enum SpawnError {
    /// Command not found in PATH
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// Other spawn error with errno
    Spawn(i32),
    /// Wait error with errno
    Wait(i32),
    /// Invalid argument (null byte in string)
    InvalidArg,
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(s) => write!(f, "command not found: {s}"),
            Self::PermissionDenied(s) => write!(f, "permission denied: {s}"),
            Self::Spawn(e) => write!(f, "spawn error: errno {e}"),
            Self::Wait(e) => write!(f, "wait error: errno {e}"),
            Self::InvalidArg => write!(f, "invalid argument"),
        }
    }
}

/// Raw wait(2) status for an already-reaped child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawWaitStatus {
    status: i32,
}

impl RawWaitStatus {
    #[cfg(test)]
    pub(crate) fn from_raw(status: i32) -> Self {
        Self { status }
    }

    /// Exit code if the child exited normally
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        if libc::WIFEXITED(self.status) {
            Some(libc::WEXITSTATUS(self.status))
        } else {
            None
        }
    }

    /// Signal number if the child was terminated by a signal
    #[inline]
    #[must_use]
    pub fn signal(&self) -> Option<i32> {
        if libc::WIFSIGNALED(self.status) {
            Some(libc::WTERMSIG(self.status))
        } else {
            None
        }
    }

    /// The untranslated status word, for diagnostics
    #[inline]
    #[must_use]
    pub fn raw(&self) -> i32 {
        self.status
    }
}

/// The one child a supervisor run owns: pid plus the command line that
/// produced it. Reaped at most once; `reaped` guards double waits.
#[derive(Debug)]
pub struct ChildProcess {
    pid: libc::pid_t,
    command: String,
    args: Vec<String>,
    reaped: bool,
}

impl ChildProcess {
    /// Process ID of the child
    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.pid
    }

    /// The command line this child was launched with, for diagnostics
    #[must_use]
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            let mut line = self.command.clone();
            for arg in &self.args {
                line.push(' ');
                line.push_str(arg);
            }
            line
        }
    }

    /// Block until the child terminates and collect its status.
    ///
    /// Retries on EINTR: once we decide to reap, nothing may cut the
    /// wait short. ECHILD surfaces as `SpawnError::Wait(ECHILD)` for the
    /// caller to treat as the inconsistency it is.
    pub fn wait(&mut self) -> Result<RawWaitStatus, SpawnError> {
        if self.reaped {
            return Err(SpawnError::Wait(0));
        }

        let mut status: i32 = 0;
        loop {
            // SAFETY: pid came from posix_spawnp, status is a valid out-pointer
            let ret = unsafe { libc::waitpid(self.pid, &raw mut status, 0) };

            if ret == self.pid {
                self.reaped = true;
                return Ok(RawWaitStatus { status });
            }
            if ret < 0 {
                let e = errno();
                if e == libc::EINTR {
                    continue;
                }
                return Err(SpawnError::Wait(e));
            }
            /* waitpid(pid, .., 0) returning any other value is a kernel
             * contract violation; report it rather than loop */
            return Err(SpawnError::Wait(0));
        }
    }

    /// Check for termination without blocking.
    pub fn try_wait(&mut self) -> Result<Option<RawWaitStatus>, SpawnError> {
        if self.reaped {
            return Ok(None);
        }

        let mut status: i32 = 0;
        // SAFETY: pid came from posix_spawnp, status is a valid out-pointer
        let ret = unsafe { libc::waitpid(self.pid, &raw mut status, libc::WNOHANG) };

        if ret < 0 {
            return Err(SpawnError::Wait(errno()));
        }
        if ret == 0 {
            /* still running */
            return Ok(None);
        }

        self.reaped = true;
        Ok(Some(RawWaitStatus { status }))
    }

    /// Force-kill the child. Used only on supervisor-internal failure
    /// paths where we must not leak a running process. ESRCH is fine.
    pub fn kill(&mut self) -> Result<(), SpawnError> {
        if self.reaped {
            return Ok(());
        }

        // SAFETY: kill is safe to call with any pid/signal combination
        let ret = unsafe { libc::kill(self.pid, libc::SIGKILL) };

        if ret < 0 {
            let e = errno();
            if e == libc::ESRCH {
                /* already dead */
                return Ok(());
            }
            return Err(SpawnError::Wait(e));
        }

        Ok(())
    }
}

/// Spawn `command` with `args` via posix_spawnp (PATH search), inheriting
/// stdio and environment.
///
/// # Errors
///
/// `NotFound` / `PermissionDenied` / `Spawn(errno)` if process creation
/// fails; no half-started process survives a failure.
pub fn spawn_command(command: &str, args: &[String]) -> Result<ChildProcess, SpawnError> {
    /* build argv: [command, args..., NULL] */
    let cmd_cstr = CString::new(command).map_err(|_| SpawnError::InvalidArg)?;

    let mut argv_cstrs: Vec<CString> = Vec::with_capacity(args.len() + 1);
    argv_cstrs.push(cmd_cstr.clone());
    for arg in args {
        argv_cstrs.push(CString::new(arg.as_str()).map_err(|_| SpawnError::InvalidArg)?);
    }

    let mut argv_ptrs: Vec<*const c_char> = Vec::with_capacity(argv_cstrs.len() + 1);
    for cstr in &argv_cstrs {
        argv_ptrs.push(cstr.as_ptr());
    }
    argv_ptrs.push(ptr::null());

    /* no file actions, no attributes: the child gets our fds, our
     * environment, our process group. POSIX allows null for both. */
    let mut pid: libc::pid_t = 0;
    // SAFETY: cmd_cstr and argv_ptrs outlive the call and are
    // null-terminated; environ is the process environment; null
    // file_actions/attrp select the defaults per POSIX.
    let ret = unsafe {
        libc::posix_spawnp(
            &raw mut pid,
            cmd_cstr.as_ptr(),
            ptr::null(),
            ptr::null(),
            argv_ptrs.as_ptr() as *const *mut c_char,
            environ as *const *mut c_char,
        )
    };

    if ret != 0 {
        return Err(match ret {
            libc::ENOENT => SpawnError::NotFound(command.into()),
            libc::EACCES | libc::EPERM => SpawnError::PermissionDenied(command.into()),
            _ => SpawnError::Spawn(ret),
        });
    }

    Ok(ChildProcess {
        pid,
        command: command.into(),
        args: args.to_vec(),
        reaped: false,
    })
}

#[inline]
pub(crate) fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/*
 * These tests are skipped under Miri because posix_spawnp and waitpid are
 * unsupported foreign functions. The same paths run natively via the
 * integration tests.
 */
