//! Process Runner
//!
//! Launches one external command with its stdin/stdout wired to files and
//! reports completion as a value. A child that is still running when the
//! runner gives up on it is terminated before the error is returned, so no
//! process outlives its stage holding file handles open.

use crate::command::CommandSpec;
use std::fs::File;
use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Poll interval while waiting on a child with a deadline
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Grace period between SIGTERM and SIGKILL
const TERMINATE_GRACE: Duration = Duration::from_millis(50);

/// Stderr kept in an [`RunError::Exit`] message
const MAX_STDERR_BYTES: usize = 4 * 1024;

/// How long stderr may stay open after the child exited. A backgrounded
/// grandchild can hold the pipe for as long as it lives.
const STDERR_LINGER: Duration = Duration::from_millis(100);

/// Errors from running a single external command
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("stream error while {context}: {source}")]
    Stream {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` did not finish within {limit:?}")]
    Timeout { command: String, limit: Duration },
}

impl RunError {
    /// Stream failure with a short description of what was being done.
    pub fn stream(context: impl Into<String>, source: std::io::Error) -> Self {
        RunError::Stream {
            context: context.into(),
            source,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

/// Runs commands with an optional per-process deadline.
///
/// With no timeout the runner waits for the child indefinitely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner. `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Configured deadline
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `spec`, feeding `stdin` (or nothing) and writing stdout into `stdout`.
    ///
    /// Stderr is captured and attached to [`RunError::Exit`].
    pub fn run(
        &self,
        spec: &CommandSpec,
        stdin: Option<File>,
        stdout: File,
    ) -> Result<(), RunError> {
        let mut command = spec.to_command();
        command
            .stdin(stdin.map(Stdio::from).unwrap_or_else(Stdio::null))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped());

        let child = command.spawn().map_err(|source| RunError::Spawn {
            command: spec.to_string(),
            source,
        })?;
        debug!(command = %spec, pid = child.id(), "spawned");

        let mut guard = ChildGuard { child };
        let stderr = guard.child.stderr.take().map(drain_stderr);

        let waited = match self.timeout {
            Some(limit) => match guard.wait_until(Instant::now() + limit) {
                Ok(Some(status)) => Ok(status),
                Ok(None) => {
                    warn!(command = %spec, ?limit, "timed out, terminating");
                    Err(RunError::Timeout {
                        command: spec.to_string(),
                        limit,
                    })
                }
                Err(e) => Err(e),
            },
            None => guard
                .child
                .wait()
                .map_err(|e| RunError::stream(format!("waiting for `{}`", spec), e)),
        };
        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                guard.terminate();
                return Err(e);
            }
        };

        let stderr = stderr
            .map(|tail| tail.collect(STDERR_LINGER))
            .unwrap_or_default();

        debug!(command = %spec, %status, "exited");
        if status.success() {
            Ok(())
        } else {
            Err(RunError::Exit {
                command: spec.to_string(),
                status,
                stderr,
            })
        }
    }
}

/// Tail of a child's stderr, filled by a helper thread
struct StderrTail {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: Receiver<()>,
}

impl StderrTail {
    /// Wait up to `linger` for the pipe to close, then take what was read.
    fn collect(self, linger: Duration) -> String {
        let _ = self.closed.recv_timeout(linger);
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        let start = buf.len().saturating_sub(MAX_STDERR_BYTES);
        String::from_utf8_lossy(&buf[start..]).trim_end().to_string()
    }
}

/// Read a child's stderr on a helper thread so a chatty child never blocks
/// on a full pipe.
fn drain_stderr(mut pipe: std::process::ChildStderr) -> StderrTail {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, closed) = mpsc::channel();
    let shared = Arc::clone(&buf);
    std::thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let mut buf = shared.lock().unwrap_or_else(|e| e.into_inner());
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.len() > 2 * MAX_STDERR_BYTES {
                        let excess = buf.len() - MAX_STDERR_BYTES;
                        buf.drain(..excess);
                    }
                }
            }
        }
        let _ = tx.send(());
    });
    StderrTail { buf, closed }
}

/// Owns a spawned child and kills it on drop if it is still running.
struct ChildGuard {
    child: Child,
}

impl ChildGuard {
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait until the child exits or `deadline` passes (`Ok(None)`).
    fn wait_until(&mut self, deadline: Instant) -> Result<Option<ExitStatus>, RunError> {
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Ok(Some(status)),
                Ok(None) => {}
                Err(e) => return Err(RunError::stream("waiting for child", e)),
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            std::thread::sleep(remaining.min(POLL_INTERVAL));
        }
    }

    /// SIGTERM, brief grace period, then SIGKILL; always reaps.
    fn terminate(&mut self) {
        if !self.is_alive() {
            return;
        }
        let _ = send_sigterm(&self.child);
        std::thread::sleep(TERMINATE_GRACE);
        if self.is_alive() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> Result<(), std::io::Error> {
    Ok(())
}
