//! Settings read from the environment

/// Echo every log entry to stderr as it is recorded.
pub const VERBOSE_VAR: &str = "EMX_TESTKIT_VERBOSE";
/// Keep temporary directories even when the test passes.
pub const WORK_VAR: &str = "EMX_TESTKIT_WORK";

/// Behavior switches for [`crate::TestReporter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    pub keep_work: bool,
}

impl Settings {
    /// Read the settings from `EMX_TESTKIT_VERBOSE` and `EMX_TESTKIT_WORK`.
    /// A variable counts as set whatever its value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).is_some())
    }

    fn from_lookup(is_set: impl Fn(&str) -> bool) -> Self {
        Self {
            verbose: is_set(VERBOSE_VAR),
            keep_work: is_set(WORK_VAR),
        }
    }
}
