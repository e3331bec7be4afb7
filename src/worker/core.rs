//! A supervised worker process.
//!
//! Each [`Worker`] owns:
//! - One child process
//! - The write end of its stdin (requests)
//! - The read end of its stdout (responses)
//!
//! # Dispatch
//!
//! A dispatch writes one request line and waits for one response line.
//! The read is raced against the deadline; if the deadline wins, the read
//! is dropped unfinished and the process is killed, so a late answer can
//! never be mistaken for the response to a later request.
//!
//! Every failure is fatal: a dead worker is never revived, only replaced.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::WorkerId;
use crate::protocol::encode_line;

use super::command::WorkerCommand;

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: Option<u32>,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Kills the process and waits for it to exit.
    ///
    /// Does nothing if the process was already killed.
    async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            // `Child::kill` also reaps, so the pid is gone once this returns.
            if let Err(e) = child.kill().await {
                debug!(pid = ?self.pid, error = %e, "Failed to kill worker process");
            }
            debug!(pid = ?self.pid, "Worker process terminated");
        }
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = ?self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// WorkerIo
// ============================================================================

/// Process and streams, only touched under the worker's lock.
struct WorkerIo {
    process: ProcessGuard,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

// ============================================================================
// Worker
// ============================================================================

/// One long-lived worker process speaking line-delimited JSON.
///
/// # Thread Safety
///
/// `Worker` is `Send + Sync`. Dispatches to the same worker are serialized
/// by an internal lock; [`is_alive`](Self::is_alive) never waits on it.
pub struct Worker {
    /// Unique identity of this spawn.
    id: WorkerId,
    /// OS process ID at spawn time.
    pid: Option<u32>,
    /// Cleared exactly once, on the first fatal fault.
    alive: AtomicBool,
    /// Exclusive access to the process streams.
    io: Mutex<WorkerIo>,
}

// ============================================================================
// Worker - Display
// ============================================================================

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("pid", &self.pid)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Worker - Constructor
// ============================================================================

impl Worker {
    /// Spawns a worker process.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the process cannot be started.
    pub fn spawn(command: &WorkerCommand) -> Result<Self> {
        let id = WorkerId::next();
        let mut child = command.to_command().spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::transport(id, "stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::transport(id, "stdout was not captured"))?;

        let process = ProcessGuard::new(child);
        let pid = process.pid;

        info!(worker_id = %id, pid = ?pid, "Worker spawned");

        Ok(Self {
            id,
            pid,
            alive: AtomicBool::new(true),
            io: Mutex::new(WorkerIo {
                process,
                stdin,
                stdout: BufReader::new(stdout),
            }),
        })
    }
}

// ============================================================================
// Worker - Public API
// ============================================================================

impl Worker {
    /// Returns this worker's unique ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Returns the OS process ID captured at spawn time.
    #[inline]
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Returns `true` until the worker suffers its first fatal fault.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Sends one request and waits for its response line.
    ///
    /// The payload is serialized as a single line of JSON. The returned
    /// bytes are the response line exactly as the worker wrote it,
    /// including the trailing newline.
    ///
    /// The deadline starts once this call holds the worker's lock, and
    /// bounds both the write and the read.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyDead`] if the worker was dead before anything was written
    /// - [`Error::Json`] if the payload cannot be serialized (worker stays alive)
    /// - [`Error::Transport`] if writing or reading fails (worker killed)
    /// - [`Error::Timeout`] if the deadline elapses (worker killed)
    pub async fn dispatch<T>(&self, payload: &T, deadline: Duration) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        if !self.is_alive() {
            return Err(Error::already_dead(self.id));
        }

        let mut io = self.io.lock().await;

        // Re-check: the previous holder may have killed the worker.
        if !self.is_alive() {
            return Err(Error::already_dead(self.id));
        }

        let line = encode_line(payload)?;
        let expires = deadline_from_now(deadline);

        let written = timeout_at(expires, io.stdin.write_all(&line)).await;

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.kill(&mut io, "write failed").await;
                return Err(Error::transport(self.id, format!("write failed: {e}")));
            }
            Err(_) => return Err(self.expire(&mut io, deadline).await),
        }

        trace!(worker_id = %self.id, bytes = line.len(), "Request written");

        let mut response = Vec::new();
        let read = timeout_at(expires, io.stdout.read_until(b'\n', &mut response)).await;

        match read {
            Ok(Ok(_)) if response.last() == Some(&b'\n') => {
                trace!(worker_id = %self.id, bytes = response.len(), "Response read");
                Ok(response)
            }
            Ok(Ok(0)) => {
                self.kill(&mut io, "output closed").await;
                Err(Error::transport(self.id, "worker closed its output stream"))
            }
            Ok(Ok(_)) => {
                self.kill(&mut io, "output closed mid-line").await;
                Err(Error::transport(
                    self.id,
                    "worker closed its output stream mid-line",
                ))
            }
            Ok(Err(e)) => {
                self.kill(&mut io, "read failed").await;
                Err(Error::transport(self.id, format!("read failed: {e}")))
            }
            Err(_) => Err(self.expire(&mut io, deadline).await),
        }
    }

    /// Kills the worker process and marks the worker dead.
    ///
    /// Waits for an in-flight dispatch to finish first. Safe to call on a
    /// worker that is already dead.
    pub async fn terminate(&self) {
        let mut io = self.io.lock().await;
        self.alive.store(false, Ordering::Release);
        io.process.kill().await;
    }
}

// ============================================================================
// Deadlines
// ============================================================================

/// Stand-in horizon (about 30 years) for durations too large to add to now.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Returns the instant `after` from now, saturating instead of overflowing.
pub(crate) fn deadline_from_now(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after).unwrap_or_else(|| now + FAR_FUTURE)
}

// ============================================================================
// Worker - Internal
// ============================================================================

impl Worker {
    /// Marks the worker dead and kills its process.
    async fn kill(&self, io: &mut WorkerIo, reason: &'static str) {
        self.alive.store(false, Ordering::Release);
        warn!(worker_id = %self.id, pid = ?self.pid, reason, "Worker died");
        io.process.kill().await;
    }

    /// Handles an elapsed deadline and returns the timeout error.
    async fn expire(&self, io: &mut WorkerIo, deadline: Duration) -> Error {
        let timeout_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
        self.alive.store(false, Ordering::Release);
        warn!(worker_id = %self.id, pid = ?self.pid, timeout_ms, "Worker timed out, killing");
        io.process.kill().await;
        Error::timeout(self.id, timeout_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
