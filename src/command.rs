//! Running an external command and checking its results
//!
//! A [`Command`] is configured once with a program and arguments, then run
//! any number of times with different inputs. The checks applied to stdout,
//! stderr and the exit code can be changed between runs.
//!
//! ```no_run
//! use emx_testkit::{Command, TestReporter};
//!
//! let mut t = TestReporter::new();
//! let mut c = Command::new("/bin/sh", &["-c", "read x; echo a $x b"]);
//! c.want_stdout("a seven b\n");
//! c.run(&mut t, "seven\n");
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use crate::output::Truncation;
use crate::process::Launch;
use crate::reporter::Reporter;

type OutputCheck = Box<dyn Fn(&mut dyn Reporter, &str) -> bool>;
type CodeCheck = Box<dyn Fn(&mut dyn Reporter, i32) -> bool>;

/// An external command run inside a test case, with checks on its results.
///
/// Not safe for concurrent use without external synchronization.
#[derive(Default)]
pub struct Command {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
    truncation: Truncation,
    check_out: Option<OutputCheck>,
    check_err: Option<OutputCheck>,
    check_code: Option<CodeCheck>,
}

impl Command {
    /// Create a command running `program` with `args`.
    ///
    /// `program` is looked up on `PATH` unless it contains a path separator.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Set the check applied to the command's output.
    ///
    /// Without a check, the output must be empty.
    pub fn check_stdout(&mut self, check: impl Fn(&str) -> bool + 'static) -> &mut Self {
        self.check_stdout_with(move |_, actual| check(actual))
    }

    /// Like [`check_stdout`](Self::check_stdout), but the check may report
    /// its own diagnostics through the test's reporter.
    pub fn check_stdout_with(&mut self, check: impl Fn(&mut dyn Reporter, &str) -> bool + 'static) -> &mut Self {
        self.check_out = Some(Box::new(check));
        self
    }

    /// Restore the default stdout check: output must be empty.
    pub fn clear_stdout_check(&mut self) -> &mut Self {
        self.check_out = None;
        self
    }

    /// Set the check applied to the command's error output.
    ///
    /// Without a check, the error output must be empty.
    pub fn check_stderr(&mut self, check: impl Fn(&str) -> bool + 'static) -> &mut Self {
        self.check_stderr_with(move |_, actual| check(actual))
    }

    pub fn check_stderr_with(&mut self, check: impl Fn(&mut dyn Reporter, &str) -> bool + 'static) -> &mut Self {
        self.check_err = Some(Box::new(check));
        self
    }

    /// Restore the default stderr check: error output must be empty.
    pub fn clear_stderr_check(&mut self) -> &mut Self {
        self.check_err = None;
        self
    }

    /// Set the check applied to the command's exit code.
    ///
    /// Without a check, the exit code is only examined when stdout and stderr
    /// both passed. It must then be 0 if there was no error output, and
    /// non-zero otherwise.
    pub fn check_code(&mut self, check: impl Fn(i32) -> bool + 'static) -> &mut Self {
        self.check_code_with(move |_, actual| check(actual))
    }

    pub fn check_code_with(&mut self, check: impl Fn(&mut dyn Reporter, i32) -> bool + 'static) -> &mut Self {
        self.check_code = Some(Box::new(check));
        self
    }

    /// Restore the default exit code policy.
    pub fn clear_code_check(&mut self) -> &mut Self {
        self.check_code = None;
        self
    }

    /// The output must be exactly `expected`.
    pub fn want_stdout(&mut self, expected: impl Into<String>) -> &mut Self {
        let expected = expected.into();
        self.check_stdout(move |actual| actual == expected)
    }

    /// The error output must be exactly `expected`.
    pub fn want_stderr(&mut self, expected: impl Into<String>) -> &mut Self {
        let expected = expected.into();
        self.check_stderr(move |actual| actual == expected)
    }

    /// The exit code must be `expected`.
    pub fn want_code(&mut self, expected: i32) -> &mut Self {
        self.check_code(move |actual| actual == expected)
    }

    /// Set the working directory. An empty path means the current directory.
    pub fn chdir(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        self.dir = if path.as_os_str().is_empty() { None } else { Some(path) };
        self
    }

    /// Set an environment variable for the command, on top of the inherited environment.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    /// Kill the command and fail the test if it runs longer than `timeout`.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how long input and output are shortened in failure reports.
    pub fn truncation(&mut self, truncation: Truncation) -> &mut Self {
        self.truncation = truncation;
        self
    }

    /// Run the command with `input` as its stdin and check the results.
    ///
    /// On any failed check, every failure is reported to `t`, followed by
    /// the command line, its input, output, error output and exit code, and
    /// then `t` is aborted once.
    ///
    /// If the command cannot be started, is killed by a signal, or times
    /// out, the error is reported and `t` aborted without checking anything.
    ///
    /// A panic inside a check propagates out of `run`.
    ///
    /// # Panics
    ///
    /// Panics if the command was created with `Command::default()` rather
    /// than [`Command::new`].
    pub fn run(&self, t: &mut dyn Reporter, input: &str) {
        t.helper();
        if self.program.is_empty() {
            panic!("Command not initialized; use Command::new to create commands");
        }

        let launch = Launch {
            program: &self.program,
            args: &self.args,
            dir: self.dir.as_deref(),
            env: &self.env,
            stdin: Some(input),
            timeout: self.timeout,
        };
        let captured = match launch.run() {
            Ok(captured) => captured,
            Err(e) => {
                t.fatal(&[&e]);
                // In case fail_now returns, as it does for test doubles.
                return;
            }
        };
        let out: &str = &captured.stdout;
        let err: &str = &captured.stderr;
        let code = captured.code;

        let mut ok = true;

        match self.check_out {
            None if !out.is_empty() => {
                self.failed_check(t, "unexpected output");
                ok = false;
            }
            Some(ref check) if !check(&mut *t, out) => {
                self.failed_check(t, "incorrect output");
                ok = false;
            }
            _ => {}
        }

        match self.check_err {
            None if !err.is_empty() => {
                self.failed_check(t, "unexpected error output");
                ok = false;
            }
            Some(ref check) if !check(&mut *t, err) => {
                self.failed_check(t, "incorrect error output");
                ok = false;
            }
            _ => {}
        }

        match self.check_code {
            None if ok => {
                if err.is_empty() && code != 0 {
                    self.failed_check(t, "non-zero exit code");
                    ok = false;
                } else if !err.is_empty() && code == 0 {
                    self.failed_check(t, "error output produced but exit code was 0");
                    ok = false;
                }
            }
            Some(ref check) if !check(&mut *t, code) => {
                self.failed_check(t, "incorrect exit code");
                ok = false;
            }
            _ => {}
        }

        if !ok {
            self.report(t, input, out, err, code);
            t.fail_now();
        }
    }

    fn failed_check(&self, t: &mut dyn Reporter, what: &str) {
        tracing::trace!(program = %self.program, what, "command check failed");
        t.error(&[&what]);
    }

    /// Report everything known about a failed run.
    ///
    /// Multi-line texts go through `errorf`, which does not add a second
    /// newline after text that already ends with one.
    fn report(&self, t: &mut dyn Reporter, input: &str, out: &str, err: &str, code: i32) {
        if self.args.is_empty() {
            t.errorf(format_args!("command: {}", self.program));
        } else {
            t.errorf(format_args!("command: {} {}", self.program, self.args.join(" ")));
        }
        report_text(t, "no input", "input", input);
        report_text(t, "no output", "output", &self.truncation.abbreviate(out));
        report_text(t, "no error output", "error output", &self.truncation.abbreviate(err));
        t.errorf(format_args!("exit code: {}", code));
    }
}

fn report_text(t: &mut dyn Reporter, empty: &str, label: &str, text: &str) {
    if text.is_empty() {
        t.error(&[&empty]);
    } else {
        t.errorf(format_args!("{}:\n{}", label, text));
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("dir", &self.dir)
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .field("check_stdout", &self.check_out.is_some())
            .field("check_stderr", &self.check_err.is_some())
            .field("check_code", &self.check_code.is_some())
            .finish()
    }
}
