//! Abbreviation of long captured output for diagnostics

use std::borrow::Cow;

/// How long text is shortened before it is reported.
///
/// Text longer than `threshold` bytes is rendered as its first `head`
/// bytes, `" ... "`, and its last `tail` bytes. Cut points are moved to
/// the nearest character boundary inside the kept windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub threshold: usize,
    pub head: usize,
    pub tail: usize,
}

impl Truncation {
    pub const DEFAULT_THRESHOLD: usize = 1000;
    pub const DEFAULT_HEAD: usize = 150;
    pub const DEFAULT_TAIL: usize = 150;

    /// Never shorten anything.
    pub fn none() -> Self {
        Self {
            threshold: usize::MAX,
            head: 0,
            tail: 0,
        }
    }

    /// Shorten `text` if it exceeds the threshold.
    pub fn abbreviate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.len() <= self.threshold || self.head.saturating_add(self.tail) >= text.len() {
            return Cow::Borrowed(text);
        }

        let mut head_end = self.head;
        while !text.is_char_boundary(head_end) {
            head_end -= 1;
        }
        let mut tail_start = text.len() - self.tail;
        while !text.is_char_boundary(tail_start) {
            tail_start += 1;
        }

        Cow::Owned(format!("{} ... {}", &text[..head_end], &text[tail_start..]))
    }
}

impl Default for Truncation {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            head: Self::DEFAULT_HEAD,
            tail: Self::DEFAULT_TAIL,
        }
    }
}
