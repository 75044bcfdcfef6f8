//! The reporting capability
//!
//! Everything in this crate reports through [`Reporter`]. The real test
//! context ([`crate::TestReporter`]) and the [`crate::Recorder`] double both
//! implement it, so helpers can be tested without failing the enclosing test.

use std::fmt;

/// The operations a test context must provide.
///
/// `fail_now` aborts the remaining test logic in a real test context and
/// does not return there. Test doubles return from it; callers that must
/// stop after an abort should return right after calling it.
pub trait Reporter {
    /// Mark the test failed and keep going.
    fn fail(&mut self);

    /// Mark the test failed and stop it.
    fn fail_now(&mut self);

    /// Whether the test has been marked failed.
    fn failed(&self) -> bool;

    /// Record the values joined by single spaces, followed by a newline.
    fn log(&mut self, values: &[&dyn fmt::Display]);

    /// Record formatted text, ending with exactly one added newline
    /// unless the text already ends with one.
    fn logf(&mut self, args: fmt::Arguments<'_>);

    /// Mark the calling function as a test helper.
    fn helper(&mut self) {}

    /// `fail` plus `log`.
    fn error(&mut self, values: &[&dyn fmt::Display]) {
        self.fail();
        self.log(values);
    }

    /// `fail` plus `logf`.
    fn errorf(&mut self, args: fmt::Arguments<'_>) {
        self.fail();
        self.logf(args);
    }

    /// `log` plus `fail_now`.
    fn fatal(&mut self, values: &[&dyn fmt::Display]) {
        self.log(values);
        self.fail_now();
    }

    /// `logf` plus `fail_now`.
    fn fatalf(&mut self, args: fmt::Arguments<'_>) {
        self.logf(args);
        self.fail_now();
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn fail(&mut self) {
        (**self).fail()
    }

    fn fail_now(&mut self) {
        (**self).fail_now()
    }

    fn failed(&self) -> bool {
        (**self).failed()
    }

    fn log(&mut self, values: &[&dyn fmt::Display]) {
        (**self).log(values)
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        (**self).logf(args)
    }

    fn helper(&mut self) {
        (**self).helper()
    }

    fn error(&mut self, values: &[&dyn fmt::Display]) {
        (**self).error(values)
    }

    fn errorf(&mut self, args: fmt::Arguments<'_>) {
        (**self).errorf(args)
    }

    fn fatal(&mut self, values: &[&dyn fmt::Display]) {
        (**self).fatal(values)
    }

    fn fatalf(&mut self, args: fmt::Arguments<'_>) {
        (**self).fatalf(args)
    }
}

/// Wraps a reporter and turns aborting failures into plain failures.
///
/// Useful for running helpers that always abort on failure in a place
/// where several independent failures should be collected in one pass.
///
/// ```
/// use emx_testkit::{require, ErrorsNotFatal, Recorder, Reporter};
///
/// let mut rec = Recorder::default();
/// let mut t = ErrorsNotFatal(&mut rec);
/// require(&mut t, false);
/// require(&mut t, false);
/// assert!(rec.failed());
/// assert!(!rec.aborted());
/// assert_eq!(rec.logged(), "Test requirement failed\nTest requirement failed\n");
/// ```
#[derive(Debug, Default)]
pub struct ErrorsNotFatal<R>(pub R);

impl<R> ErrorsNotFatal<R> {
    /// Unwrap the inner reporter.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Reporter> Reporter for ErrorsNotFatal<R> {
    fn fail(&mut self) {
        self.0.fail()
    }

    fn fail_now(&mut self) {
        self.0.fail()
    }

    fn failed(&self) -> bool {
        self.0.failed()
    }

    fn log(&mut self, values: &[&dyn fmt::Display]) {
        self.0.log(values)
    }

    fn logf(&mut self, args: fmt::Arguments<'_>) {
        self.0.logf(args)
    }

    fn helper(&mut self) {
        self.0.helper()
    }

    fn error(&mut self, values: &[&dyn fmt::Display]) {
        self.0.error(values)
    }

    fn errorf(&mut self, args: fmt::Arguments<'_>) {
        self.0.errorf(args)
    }

    fn fatal(&mut self, values: &[&dyn fmt::Display]) {
        self.0.error(values)
    }

    fn fatalf(&mut self, args: fmt::Arguments<'_>) {
        self.0.errorf(args)
    }
}
