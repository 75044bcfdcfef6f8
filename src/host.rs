//! The reporter for real `cargo test` cases
//!
//! A Rust test fails by panicking, so aborting a [`TestReporter`] panics
//! with everything logged so far. A test marked failed without being
//! aborted panics when the reporter is dropped.

use std::fmt::{self, Write as _};
use std::path::PathBuf;
use crate::config::Settings;
use crate::reporter::Reporter;

/// A [`Reporter`] for the current `#[test]` function.
///
/// ```no_run
/// use emx_testkit::{expect, TestReporter};
///
/// let mut t = TestReporter::new();
/// expect(&mut t, 4, 2 + 2);
/// ```
#[derive(Debug)]
pub struct TestReporter {
    name: String,
    log: String,
    failed: bool,
    settings: Settings,
    temp_dirs: Vec<tempfile::TempDir>,
}

impl TestReporter {
    /// Create a reporter named after the current test, with settings from the environment.
    pub fn new() -> Self {
        Self::with_settings(Settings::from_env())
    }

    pub fn with_settings(settings: Settings) -> Self {
        // The libtest harness names each test thread after its test.
        let name = std::thread::current()
            .name()
            .unwrap_or("unknown")
            .to_string();
        Self {
            name,
            log: String::new(),
            failed: false,
            settings,
            temp_dirs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text logged so far.
    pub fn logged(&self) -> &str {
        &self.log
    }

    /// Create a new temporary directory for this test.
    ///
    /// It is removed when the reporter is dropped, unless the test failed
    /// or `EMX_TESTKIT_WORK` is set.
    pub fn temp_dir(&mut self) -> PathBuf {
        let prefix = format!("testkit-{}-", self.name.replace("::", "-"));
        match tempfile::Builder::new().prefix(&prefix).tempdir() {
            Ok(dir) => {
                let path = dir.path().to_path_buf();
                self.temp_dirs.push(dir);
                path
            }
            Err(e) => {
                self.fatalf(format_args!("failed to create temp dir: {}", e));
                unreachable!("fail_now returned");
            }
        }
    }

    fn append(&mut self, start: usize) {
        if self.settings.verbose {
            eprint!("{}", &self.log[start..]);
        }
    }

    fn keep_temp_dirs(&mut self) {
        for dir in std::mem::take(&mut self.temp_dirs) {
            let path = dir.path().to_path_buf();
            // Leak the handle so the directory survives.
            std::mem::forget(dir);
            let _ = writeln!(self.log, "kept temp dir: {}", path.display());
        }
    }

    fn report(&self) -> String {
        format!("test {} failed:\n{}", self.name, self.log)
    }
}

impl Default for TestReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TestReporter {
    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) {
        self.failed = true;
        self.keep_temp_dirs();
        panic!("{}", self.report());
    }

    fn failed(&self) -> bool {
        self.failed
    }

    fn log(&mut self, values: &[&dyn fmt::Display]) {
        let start = self.log.len();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.log.push(' ');
            }
            let _ = write!(self.log, "{}", value);
        }
        self.log.push('\n');
        self.append(start);
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        let start = self.log.len();
        let _ = self.log.write_fmt(args);
        if self.log.len() == start || !self.log.ends_with('\n') {
            self.log.push('\n');
        }
        self.append(start);
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.failed || self.settings.keep_work {
            self.keep_temp_dirs();
        }
        if self.failed && !std::thread::panicking() {
            panic!("{}", self.report());
        }
    }
}
