//! Fixed-size pool of supervised workers.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 WorkerPool                    │
//! │  cursor ──► [ W1 | W2 (dead) | W3 | W4 ]      │
//! │                      │                        │
//! │           replacement request (slot 1)        │
//! │                      ▼                        │
//! │  ┌────────────┐            ┌──────────────┐   │
//! │  │  replacer  │◄───────────│ health sweep │   │
//! │  └────────────┘  every N s └──────────────┘   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Acquisition walks the slots round-robin and hands out the first live
//! worker. Dead slots it passes are queued for replacement; the replacer
//! task spawns fresh workers off the request path, and the health sweep
//! re-queues dead slots that traffic never touches.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::WorkerId;
use crate::protocol::{Deadlines, Request};
use crate::worker::{Worker, WorkerCommand, deadline_from_now};

use super::builder::PoolBuilder;

// ============================================================================
// PoolConfig
// ============================================================================

/// Validated pool configuration.
#[derive(Debug, Clone)]
pub(crate) struct PoolConfig {
    /// How to launch each worker.
    pub command: WorkerCommand,
    /// Number of slots.
    pub size: usize,
    /// Period of the health sweep.
    pub health_interval: Duration,
    /// Per-class dispatch deadlines used by [`WorkerPool::submit`].
    pub deadlines: Deadlines,
}

// ============================================================================
// PoolState
// ============================================================================

/// Slot table, guarded by the pool lock.
struct PoolState {
    /// One worker per slot; never grows or shrinks.
    slots: Vec<Arc<Worker>>,
    /// Next slot to try.
    next: usize,
    /// Slots with a replacement queued or in progress.
    pending: FxHashSet<usize>,
}

// ============================================================================
// PoolInner
// ============================================================================

/// Shared pool state.
struct PoolInner {
    /// Launch configuration reused for every replacement.
    command: WorkerCommand,
    /// Per-class dispatch deadlines.
    deadlines: Deadlines,
    /// Slot table.
    state: Mutex<PoolState>,
    /// Replacement requests, bounded to the pool size.
    replace_tx: mpsc::Sender<usize>,
    /// Signals background tasks to stop.
    shutdown_tx: watch::Sender<bool>,
    /// Set once by shutdown.
    closed: AtomicBool,
}

// ============================================================================
// SlotStatus / PoolStatus
// ============================================================================

/// Snapshot of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    /// Slot index.
    pub slot: usize,
    /// Worker currently installed in the slot.
    pub worker_id: WorkerId,
    /// Whether that worker is alive.
    pub alive: bool,
    /// Whether a replacement is queued for the slot.
    pub pending: bool,
}

/// Snapshot of the whole pool, e.g. for a health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Number of slots.
    pub size: usize,
    /// Number of live workers.
    pub alive: usize,
    /// Number of slots awaiting replacement.
    pub pending_replacements: usize,
    /// Whether the pool has been shut down.
    pub closed: bool,
    /// Per-slot detail.
    pub slots: Vec<SlotStatus>,
}

// ============================================================================
// WorkerPool
// ============================================================================

/// Fixed-size pool of worker processes.
///
/// Cheap to clone; all clones share the same workers. Construct one at
/// startup and hand it to whatever serves requests.
///
/// # Example
///
/// ```no_run
/// use procpool::{Request, WorkerCommand, WorkerPool};
///
/// # async fn example() -> procpool::Result<()> {
/// let pool = WorkerPool::builder()
///     .command(WorkerCommand::new("python").arg("worker.py"))
///     .size(4)
///     .build()?;
///
/// let request = Request::new("evaluate_expression").arg("expr", "1 + 1");
/// let line = pool.submit(&request).await?;
///
/// pool.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WorkerPool {
    /// Shared inner state.
    inner: Arc<PoolInner>,
}

// ============================================================================
// WorkerPool - Display
// ============================================================================

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("program", self.inner.command.program())
            .field("size", &self.size())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WorkerPool - Constructor
// ============================================================================

impl WorkerPool {
    /// Creates a configuration builder for the pool.
    #[inline]
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Spawns every worker and starts the background tasks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolInit`] if any worker fails to spawn. Workers
    /// spawned before the failure are killed.
    pub(crate) fn start(config: PoolConfig) -> Result<Self> {
        let slots = (0..config.size)
            .map(|slot| {
                Worker::spawn(&config.command)
                    .map(Arc::new)
                    .map_err(|e| Error::pool_init(slot, e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let (replace_tx, replace_rx) = mpsc::channel(config.size);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(PoolInner {
            command: config.command,
            deadlines: config.deadlines,
            state: Mutex::new(PoolState {
                slots,
                next: 0,
                pending: FxHashSet::default(),
            }),
            replace_tx,
            shutdown_tx,
            closed: AtomicBool::new(false),
        });

        // Background tasks hold weak references so dropping every handle
        // tears the pool down.
        tokio::spawn(PoolInner::run_replacer(
            Arc::downgrade(&inner),
            replace_rx,
            shutdown_rx.clone(),
        ));
        tokio::spawn(PoolInner::run_health_sweep(
            Arc::downgrade(&inner),
            config.health_interval,
            shutdown_rx,
        ));

        let health_interval_ms =
            u64::try_from(config.health_interval.as_millis()).unwrap_or(u64::MAX);
        info!(
            size = config.size,
            health_interval_ms,
            "Worker pool started"
        );

        Ok(Self { inner })
    }
}

// ============================================================================
// WorkerPool - Public API
// ============================================================================

impl WorkerPool {
    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    /// Returns the configured per-class deadlines.
    #[inline]
    #[must_use]
    pub fn deadlines(&self) -> Deadlines {
        self.inner.deadlines
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Picks a live worker, round-robin.
    ///
    /// Scans at most one full turn of slots starting at the cursor. Dead
    /// slots passed on the way are queued for replacement; this never
    /// waits for a replacement to finish.
    ///
    /// The returned worker is meant for a single dispatch; do not keep it.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if every slot is dead
    /// - [`Error::PoolClosed`] if the pool has been shut down
    pub fn acquire(&self) -> Result<Arc<Worker>> {
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }

        let mut state = self.inner.state.lock();
        let size = state.slots.len();

        for _ in 0..size {
            let slot = state.next;
            state.next = (slot + 1) % size;

            let worker = Arc::clone(&state.slots[slot]);
            if worker.is_alive() {
                return Ok(worker);
            }

            self.inner.request_replacement(&mut state, slot);
        }

        warn!(size, "No live workers available");
        Err(Error::unavailable(size))
    }

    /// Acquires a worker and dispatches one payload to it.
    ///
    /// A failed dispatch is returned as-is; it is never retried on another
    /// worker.
    ///
    /// # Errors
    ///
    /// Any error from [`acquire`](Self::acquire) or [`Worker::dispatch`].
    pub async fn dispatch<T>(&self, payload: &T, deadline: Duration) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let worker = self.acquire()?;
        worker.dispatch(payload, deadline).await
    }

    /// Dispatches a request with the deadline of its operation class.
    ///
    /// # Errors
    ///
    /// Any error from [`dispatch`](Self::dispatch).
    pub async fn submit(&self, request: &Request) -> Result<Vec<u8>> {
        let deadline = self.inner.deadlines.for_operation(&request.operation);
        self.dispatch(request, deadline).await
    }

    /// Returns a snapshot of every slot.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state.lock();

        let slots: Vec<SlotStatus> = state
            .slots
            .iter()
            .enumerate()
            .map(|(slot, worker)| SlotStatus {
                slot,
                worker_id: worker.id(),
                alive: worker.is_alive(),
                pending: state.pending.contains(&slot),
            })
            .collect();

        PoolStatus {
            size: slots.len(),
            alive: slots.iter().filter(|s| s.alive).count(),
            pending_replacements: state.pending.len(),
            closed: self.is_closed(),
            slots,
        }
    }

    /// Returns the worker ID installed in each slot.
    #[must_use]
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.inner
            .state
            .lock()
            .slots
            .iter()
            .map(|worker| worker.id())
            .collect()
    }

    /// Stops the background tasks and kills every worker.
    ///
    /// In-flight dispatches finish (or hit their deadline) first.
    /// Calling this more than once is a no-op.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Worker pool shutting down");

        self.inner.shutdown_tx.send_replace(true);

        let workers: Vec<Arc<Worker>> = self.inner.state.lock().slots.clone();
        for worker in workers {
            worker.terminate().await;
        }

        info!("Worker pool shutdown complete");
    }
}

// ============================================================================
// PoolInner - Replacement
// ============================================================================

impl PoolInner {
    /// Queues a slot for replacement unless one is already pending.
    ///
    /// Never blocks: a full or closed queue drops the request, and the
    /// next acquisition or sweep will try again.
    fn request_replacement(&self, state: &mut PoolState, slot: usize) {
        if !state.pending.insert(slot) {
            return;
        }

        match self.replace_tx.try_send(slot) {
            Ok(()) => debug!(slot, "Replacement scheduled"),
            Err(e) => {
                state.pending.remove(&slot);
                debug!(slot, error = %e, "Replacement request dropped");
            }
        }
    }

    /// Spawns a fresh worker and installs it into a dead slot.
    fn replace(&self, slot: usize) {
        {
            let mut state = self.state.lock();
            if state.slots[slot].is_alive() {
                state.pending.remove(&slot);
                return;
            }
        }

        let worker = match Worker::spawn(&self.command) {
            Ok(worker) => Arc::new(worker),
            Err(e) => {
                self.state.lock().pending.remove(&slot);
                warn!(slot, error = %e, "Replacement spawn failed, will retry");
                return;
            }
        };

        let old = {
            let mut state = self.state.lock();
            state.pending.remove(&slot);

            // Shutdown already collected the slots; let the new worker drop.
            if self.closed.load(Ordering::SeqCst) {
                return;
            }

            std::mem::replace(&mut state.slots[slot], Arc::clone(&worker))
        };

        info!(
            slot,
            old_worker_id = %old.id(),
            new_worker_id = %worker.id(),
            "Worker replaced"
        );
    }

    /// Queues every dead slot for replacement.
    fn sweep(&self) {
        let mut state = self.state.lock();

        let dead: Vec<usize> = state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, worker)| !worker.is_alive())
            .map(|(slot, _)| slot)
            .collect();

        if !dead.is_empty() {
            debug!(count = dead.len(), "Health sweep found dead workers");
        }

        for slot in dead {
            self.request_replacement(&mut state, slot);
        }
    }
}

// ============================================================================
// PoolInner - Background Tasks
// ============================================================================

impl PoolInner {
    /// Background task that replaces dead workers one at a time.
    async fn run_replacer(
        pool: Weak<Self>,
        mut replace_rx: mpsc::Receiver<usize>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        debug!("Replacer started");

        loop {
            let slot = tokio::select! {
                slot = replace_rx.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
                _ = shutdown_rx.changed() => break,
            };

            let Some(inner) = pool.upgrade() else {
                break;
            };
            inner.replace(slot);
        }

        debug!("Replacer terminated");
    }

    /// Background task that periodically re-queues dead slots.
    async fn run_health_sweep(
        pool: Weak<Self>,
        period: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        debug!(period_ms, "Health sweep started");

        let mut ticker = interval_at(deadline_from_now(period), period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.changed() => break,
            }

            let Some(inner) = pool.upgrade() else {
                break;
            };
            inner.sweep();
        }

        debug!("Health sweep terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
