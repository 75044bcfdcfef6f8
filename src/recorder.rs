//! A recording reporter for testing test helpers
//!
//! [`Recorder`] stores what a helper reported instead of acting on it, so
//! the helper's behavior can be checked afterwards with [`Recorder::expect`].

use std::fmt::{self, Write as _};
use similar::TextDiff;
use crate::reporter::Reporter;

/// An in-memory [`Reporter`].
///
/// Unlike a real test context, `fail_now` returns here. Code under test
/// that keeps running after an abort will be observed doing so.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Recorder {
    log: String,
    failed: bool,
    aborted: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text recorded by `log` and `logf`.
    pub fn logged(&self) -> &str {
        &self.log
    }

    /// Whether `fail_now` was called.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        self.log.clear();
        self.failed = false;
        self.aborted = false;
    }

    /// Verify the recorded state, reporting mismatches to `t`.
    ///
    /// All three fields are checked and each mismatch is reported as a
    /// plain failure; `t` is then aborted once if anything differed.
    pub fn expect(&self, t: &mut dyn Reporter, failed: bool, aborted: bool, log: &str, when: &str) {
        t.helper();
        let mut ok = true;

        if self.failed != failed {
            let state = if failed { "not failed" } else { "failed" };
            t.errorf(format_args!("Recorder marked {} {}", state, when));
            ok = false;
        }

        if self.aborted != aborted {
            let state = if aborted { "not aborted" } else { "aborted" };
            t.errorf(format_args!("Recorder marked {} {}", state, when));
            ok = false;
        }

        if self.log != log {
            t.errorf(format_args!("{} Recorder log is '{}'; expected '{}'", when, self.log, log));
            let diff = TextDiff::from_lines(log, self.log.as_str());
            t.logf(format_args!("{}", diff.unified_diff().header("expected", "actual")));
            ok = false;
        }

        if !ok {
            t.fail_now();
        }
    }
}

impl Reporter for Recorder {
    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) {
        self.failed = true;
        self.aborted = true;
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn log(&mut self, values: &[&dyn fmt::Display]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.log.push(' ');
            }
            // Writing into a String cannot fail.
            let _ = write!(self.log, "{}", value);
        }
        self.log.push('\n');
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        let old_len = self.log.len();
        let _ = self.log.write_fmt(args);
        if self.log.len() == old_len || !self.log.ends_with('\n') {
            self.log.push('\n');
        }
    }
}
