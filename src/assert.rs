//! Assertion helpers
//!
//! Each helper reports through a [`Reporter`] and aborts the test on
//! failure. Wrap the reporter in [`crate::ErrorsNotFatal`] to keep going.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use crate::reporter::Reporter;

/// A panic payload.
pub type Payload = Box<dyn Any + Send>;

/// Fail and abort the test if `condition` is false.
pub fn require(t: &mut dyn Reporter, condition: bool) {
    t.helper();
    if !condition {
        t.fatal(&[&"Test requirement failed"]);
    }
}

/// `require(t, actual == expected)`, with a better message.
pub fn expect<T: PartialEq + fmt::Debug>(t: &mut dyn Reporter, expected: T, actual: T) {
    t.helper();
    if actual != expected {
        t.fatalf(format_args!("Expected {:?} but actual value was {:?}", expected, actual));
    }
}

/// Fail and abort the test if `result` is an error.
///
/// Returns the success value, or `None` after reporting the error.
pub fn no_error<T, E: fmt::Display>(t: &mut dyn Reporter, result: Result<T, E>) -> Option<T> {
    t.helper();
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            t.fatal(&[&e]);
            None
        }
    }
}

/// How a function guarded by [`panics`] finished.
#[derive(Debug)]
pub enum Unwind {
    /// The function returned normally.
    Returned,
    /// The function panicked. A `()` payload, as produced by
    /// `resume_unwind(Box::new(()))`, is recorded as `None`.
    Panicked(Option<Payload>),
}

impl Unwind {
    pub fn panicked(&self) -> bool {
        matches!(self, Unwind::Panicked(_))
    }

    pub fn payload(&self) -> Option<&(dyn Any + Send)> {
        match self {
            Unwind::Panicked(Some(payload)) => Some(payload.as_ref()),
            _ => None,
        }
    }

    /// The panic message, for payloads produced by `panic!` with a string.
    pub fn message(&self) -> Option<&str> {
        self.payload().and_then(payload_message)
    }

    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Unwind::Panicked(payload) => payload,
            Unwind::Returned => None,
        }
    }
}

/// The text of a `&str` or `String` panic payload.
pub fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Some(*s)
    } else {
        payload.downcast_ref::<String>().map(String::as_str)
    }
}

/// Run `f` and report whether it panicked.
pub fn panics<F: FnOnce()>(f: F) -> Unwind {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => Unwind::Returned,
        Err(payload) if payload.is::<()>() => Unwind::Panicked(None),
        Err(payload) => Unwind::Panicked(Some(payload)),
    }
}

/// Run `f` and verify that it panics.
///
/// If `f` returns normally, the test is failed and aborted. Otherwise the
/// panic payload is returned, or `None` for a `()` payload.
///
/// Under [`ErrorsNotFatal`](crate::ErrorsNotFatal) the abort returns, so a
/// missing panic also yields `None`; `t.failed()` tells the two apart.
pub fn must_panic<F: FnOnce()>(t: &mut dyn Reporter, f: F) -> Option<Payload> {
    t.helper();
    match panics(f) {
        Unwind::Returned => {
            t.fatal(&[&"Expected panic did not occur"]);
            None
        }
        Unwind::Panicked(payload) => payload,
    }
}
