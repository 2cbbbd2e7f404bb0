//! Scoped child-process exchange.
//!
//! One call spawns the solver, writes the request, closes stdin and blocks
//! until stdout and stderr are fully captured. The child is killed and reaped
//! on every exit path, so a failed trial never leaves an orphan behind.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Captured result of one solver process.
#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// How an exchange ended when no output could be captured.
#[derive(Debug)]
pub(crate) enum ExchangeError {
    Io(io::Error),
    TimedOut,
}

impl From<io::Error> for ExchangeError {
    fn from(e: io::Error) -> Self {
        ExchangeError::Io(e)
    }
}

/// Owns a running child until it has been reaped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<ExitStatus, ExchangeError> {
        let status = match timeout {
            None => self.child.wait()?,
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    if let Some(status) = self.child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        return Err(ExchangeError::TimedOut);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
        debug!(event = "child_killed", pid = self.child.id());
    }
}

fn drain<R: Read + Send + 'static>(mut source: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))?
}

/// Runs `command` to completion, feeding `input` on stdin.
pub(crate) fn exchange(
    command: &mut Command,
    input: &[u8],
    timeout: Option<Duration>,
) -> Result<Captured, ExchangeError> {
    let child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let mut guard = ChildGuard::new(child);

    let stdout = guard.child.stdout.take().map(drain);
    let stderr = guard.child.stderr.take().map(drain);

    if let Some(mut stdin) = guard.child.stdin.take() {
        match stdin.write_all(input) {
            Ok(()) => {}
            // The solver may legitimately exit before reading everything.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(event = "stdin_closed_early");
            }
            Err(e) => return Err(e.into()),
        }
    }

    // On timeout the guard kills the child; the detached readers exit once
    // the last writer of each pipe is gone.
    let status = guard.wait(timeout)?;

    let stdout = stdout.map(join).transpose()?.unwrap_or_default();
    let stderr = stderr.map(join).transpose()?.unwrap_or_default();

    Ok(Captured {
        status,
        stdout,
        stderr,
    })
}
