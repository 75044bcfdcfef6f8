//! Launching a subprocess and capturing its results
//!
//! Stdin is fed and stdout/stderr are drained on helper threads so a child
//! that writes a lot before reading its input cannot deadlock against us.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command as ProcessCommand, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use crate::error::{Error, ErrorKind};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What to launch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Launch<'a> {
    pub program: &'a str,
    pub args: &'a [String],
    pub dir: Option<&'a Path>,
    pub env: &'a [(String, String)],
    /// `None` connects stdin to the null device.
    pub stdin: Option<&'a str>,
    pub timeout: Option<Duration>,
}

/// The results of a process that exited with a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

impl Launch<'_> {
    fn error(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::new(kind, message)
            .with_program(self.program)
            .with_args(self.args.to_vec())
    }

    /// Run the process to completion.
    pub fn run(&self) -> Result<Captured, Error> {
        tracing::debug!(program = self.program, args = ?self.args, dir = ?self.dir, "launching command");

        let mut cmd = ProcessCommand::new(self.program);
        cmd.args(self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (k, v) in self.env {
            cmd.env(k, v);
        }
        cmd.stdin(if self.stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;

        if let (Some(mut pipe), Some(input)) = (child.stdin.take(), self.stdin) {
            let input = input.to_owned();
            // Detached: a background grandchild may hold stdin without reading
            // it, and a child that exits early gives a broken pipe that is not
            // our failure.
            std::thread::spawn(move || {
                let _ = pipe.write_all(input.as_bytes());
            });
        }
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // One deadline covers the child and anything it leaves holding the pipes.
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let Some(status) = self.wait(&mut child, deadline)? else {
            return Err(self.timed_out());
        };
        let (Some(stdout), Some(stderr)) = (collect(stdout, deadline)?, collect(stderr, deadline)?) else {
            return Err(self.timed_out());
        };

        let code = status.code().ok_or_else(|| {
            self.error(ErrorKind::Signaled, describe_abnormal(&status))
        })?;
        tracing::debug!(program = self.program, code, "command exited");

        Ok(Captured { stdout, stderr, code })
    }

    fn timed_out(&self) -> Error {
        // Reader threads stay detached; whatever holds the pipes open may outlive us.
        let timeout = self.timeout.unwrap_or_default();
        tracing::warn!(program = self.program, ?timeout, "command timed out");
        self.error(ErrorKind::TimedOut, format!("timed out after {:?}", timeout))
    }

    /// Wait for the child, returning `None` if it was killed at the deadline.
    fn wait(&self, child: &mut Child, deadline: Option<Instant>) -> Result<Option<ExitStatus>, Error> {
        let Some(deadline) = deadline else {
            return child.wait().map(Some).map_err(|e| self.error(ErrorKind::Io, e.to_string()));
        };

        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) => {}
                Err(e) => return Err(self.error(ErrorKind::Io, e.to_string())),
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        match self.dir {
            Some(dir) if !dir.is_dir() => self.error(
                ErrorKind::Directory,
                format!("chdir {}: directory not found", dir.display()),
            ),
            Some(dir) => self.error(
                ErrorKind::Spawn,
                format!("failed to execute '{}' in {}: {}", self.program, dir.display(), e),
            ),
            None => self.error(
                ErrorKind::Spawn,
                format!("failed to execute '{}': {}", self.program, e),
            ),
        }
    }
}

type Drained = Receiver<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drained {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let result = pipe.read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone only after a timeout.
        let _ = tx.send(result);
    });
    rx
}

/// Wait for a reader to reach end of file, returning `None` at the deadline.
fn collect(rx: Option<Drained>, deadline: Option<Instant>) -> Result<Option<String>, Error> {
    let Some(rx) = rx else {
        return Ok(Some(String::new()));
    };
    let received = match deadline {
        Some(deadline) => match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => return Err(reader_died()),
        },
        None => rx.recv().map_err(|_| reader_died())?,
    };
    let bytes = received?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn reader_died() -> Error {
    Error::new(ErrorKind::Io, "output reader thread panicked")
}

#[cfg(unix)]
fn describe_abnormal(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(sig) => format!("terminated by signal {}", sig),
        None => format!("terminated abnormally: {}", status),
    }
}

#[cfg(not(unix))]
fn describe_abnormal(status: &ExitStatus) -> String {
    format!("terminated abnormally: {}", status)
}
