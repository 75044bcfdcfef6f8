//! Launch and configuration errors

use std::fmt;

/// The kind of error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The program could not be started
    Spawn,
    /// The working directory does not exist or is not a directory
    Directory,
    /// The process was terminated by a signal instead of exiting
    Signaled,
    /// The process outlived its configured timeout and was killed
    TimedOut,
    /// IO error while talking to the process
    Io,
    /// Invalid regular expression passed to a predicate
    Pattern,
}

/// An error with optional command context
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub program: Option<String>,
    pub args: Vec<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            program: None,
            args: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn pattern(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Pattern, msg)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::TimedOut
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref program) = self.program {
            if self.args.is_empty() {
                write!(f, "{}: ", program)?;
            } else {
                let quoted = self.args.iter().map(|a| {
                    if a.contains(' ') || a.contains('\t') || a.is_empty() {
                        format!("'{}'", a)
                    } else {
                        a.clone()
                    }
                }).collect::<Vec<_>>().join(" ");
                write!(f, "{} {}: ", program, quoted)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}
