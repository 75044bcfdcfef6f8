//! Ready-made checks for [`crate::Command`]

use regex::{Regex, RegexBuilder};
use crate::error::Error;

/// Output must be exactly `expected`.
pub fn equals(expected: &str) -> impl Fn(&str) -> bool {
    let expected = expected.to_owned();
    move |actual: &str| actual == expected
}

/// Output must contain `needle`.
pub fn contains(needle: &str) -> impl Fn(&str) -> bool {
    let needle = needle.to_owned();
    move |actual: &str| actual.contains(needle.as_str())
}

/// Output must match the regular expression `pattern`.
///
/// The pattern is compiled in multi-line mode, so `^` and `$` match at
/// line boundaries.
pub fn matches(pattern: &str) -> Result<impl Fn(&str) -> bool, Error> {
    let re = compile_regex(pattern)?;
    Ok(move |actual: &str| re.is_match(actual))
}

/// Exit code must be one of `codes`.
pub fn code_in(codes: &[i32]) -> impl Fn(i32) -> bool {
    let codes = codes.to_vec();
    move |actual: i32| codes.contains(&actual)
}

/// Compile with a size limit to keep hostile patterns from blowing up (CWE-1333).
fn compile_regex(pattern: &str) -> Result<Regex, Error> {
    RegexBuilder::new(&format!("(?m){}", pattern))
        .size_limit(1 << 20)
        .build()
        .map_err(|e| Error::pattern(format!("invalid regex /{}/: {}", pattern, e)))
}
