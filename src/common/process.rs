//! Subprocess execution with a wall-clock timeout
//!
//! Output streams are drained on background threads while the child is
//! polled, so a chatty child can never block on a full pipe. On unix the
//! child leads its own process group, and the whole group is killed once the
//! child exits, when the deadline passes, or when the guard is dropped early.
//! Draining is bounded by the same deadline, so a detached grandchild that
//! keeps a pipe open cannot stall the caller.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{ProbeError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Time left for draining output when the child exits right at its deadline
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Output of a child that exited on its own
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last non-empty stderr line, for error messages
    pub fn stderr_tail(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map_or_else(|| self.status.to_string(), ToString::to_string)
    }
}

/// How a timed run ended
#[derive(Debug)]
pub enum RunOutcome {
    Exited(CapturedOutput),
    TimedOut,
}

#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

/// Kill every process left in the child's group
#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers and touches no memory of ours
    let _ = unsafe { libc::kill(-pgid, libc::SIGKILL) };
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Kills the child and its group unless the child has already been reaped
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            kill_group(&self.child);
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<Receiver<Vec<u8>>> {
    stream.map(|mut stream| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stream.read_to_end(&mut buffer);
            let _ = sender.send(buffer);
        });
        receiver
    })
}

/// Whatever the stream delivered by `deadline`; the reader thread is left
/// detached if the pipe is still held open
fn collect(receiver: Option<Receiver<Vec<u8>>>, deadline: Instant) -> String {
    let wait = deadline
        .saturating_duration_since(Instant::now())
        .max(DRAIN_GRACE);
    receiver
        .and_then(|r| r.recv_timeout(wait).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Run `command` to completion or until `timeout` elapses
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<RunOutcome> {
    let program = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    isolate(&mut command);
    let child = command
        .spawn()
        .map_err(|e| ProbeError::ProcessSpawnFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;

    let mut guard = ChildGuard {
        child,
        reaped: false,
    };
    let stdout = drain(guard.child.stdout.take());
    let stderr = drain(guard.child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        match guard.child.try_wait()? {
            Some(status) => {
                guard.reaped = true;
                // Background helpers the child started must not outlive it
                kill_group(&guard.child);
                return Ok(RunOutcome::Exited(CapturedOutput {
                    status,
                    stdout: collect(stdout, deadline),
                    stderr: collect(stderr, deadline),
                }));
            }
            None if Instant::now() >= deadline => {
                tracing::debug!(%program, ?timeout, "killing child after timeout");
                return Ok(RunOutcome::TimedOut);
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
