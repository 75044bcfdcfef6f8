//! emx-testkit: small helpers for writing test cases
//!
//! # Overview
//!
//! Every helper reports through the [`Reporter`] trait. Two implementations
//! are provided:
//!
//! - [`TestReporter`] for real `#[test]` functions, where aborting a test
//!   panics with everything logged so far;
//! - [`Recorder`], which only records what happened, for testing helpers
//!   (including the ones in this crate).
//!
//! [`ErrorsNotFatal`] wraps either one so that aborting failures become
//! plain failures.
//!
//! # Checking external commands
//!
//! ```no_run
//! use emx_testkit::{Command, TestReporter};
//!
//! let mut t = TestReporter::new();
//! let mut c = Command::new("/bin/sh", &["-c", "read x; exit $x"]);
//! c.want_code(17);
//! c.run(&mut t, "17");
//! ```
//!
//! Unless told otherwise, a [`Command`] expects no output, no error output,
//! and an exit code of 0 (or non-zero, if there was error output). On
//! failure it reports the command line, input, output, error output and
//! exit code before aborting the test.
//!
//! # Helpers
//!
//! | Helper | Description |
//! |--------|-------------|
//! | [`require`] | Abort unless a condition holds |
//! | [`expect`] | Abort unless two values are equal |
//! | [`no_error`] | Abort on an `Err` result |
//! | [`panics`] | Run a closure and report whether it panicked |
//! | [`must_panic`] | Abort unless a closure panics |
//! | [`run_command`] | Run a command that must succeed silently |
//!
//! # Environment
//!
//! - `EMX_TESTKIT_VERBOSE` - echo every log entry to stderr as it happens
//! - `EMX_TESTKIT_WORK` - keep [`TestReporter::temp_dir`] directories

mod reporter;
mod recorder;
mod assert;
mod host;
mod config;
mod command;
mod process;
mod output;
mod run;
mod error;
pub mod predicate;

pub use reporter::{Reporter, ErrorsNotFatal};
pub use recorder::Recorder;
pub use assert::{require, expect, no_error, panics, must_panic, payload_message, Unwind, Payload};
pub use host::TestReporter;
pub use config::Settings;
pub use command::Command;
pub use output::Truncation;
pub use run::run_command;
pub use error::{Error, ErrorKind};
