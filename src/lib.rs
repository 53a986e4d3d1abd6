/*
 * lib.rs
 *
 * Exists mostly for testing. Integration tests need our types, doc tests
 * need a lib. You could use this as a library but honestly just shell out.
 */

//! # supervisor
//!
//! Run a command under a wall-clock deadline and signal it if it
//! overstays. Linux-native: the race between "child exited" and
//! "deadline expired" is resolved with pidfd + timerfd + poll, not
//! signal handlers.
//!
//! ## Quick Start
//!
//! ```rust
//! use supervisor::{eval_duration, validate_signal};
//!
//! // Parse duration strings into whole seconds
//! let secs = eval_duration("2m").unwrap();
//! assert_eq!(secs, 120);
//!
//! // Validate signal numbers (default: SIGTERM)
//! let sig = validate_signal(None).unwrap();
//! assert_eq!(sig, libc::SIGTERM);
//! ```

pub mod args;
pub mod deadline;
pub mod duration;
pub mod error;
pub mod process;
pub mod runner;
pub mod signal;

pub use args::Args;
pub use deadline::DeadlineTimer;
pub use duration::eval_duration;
pub use error::{Result, SupervisorError, exit_codes};
pub use process::{ChildProcess, RawWaitStatus, spawn_command};
pub use runner::{RunConfig, TerminationResult, run_command};
pub use signal::{DEFAULT_SIGNAL, validate_signal};
