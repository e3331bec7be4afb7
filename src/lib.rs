//! procpool - Supervised pool of line-delimited JSON worker processes.
//!
//! This library routes short-lived computation requests to a small,
//! fixed-size pool of long-lived worker processes, and keeps serving while
//! individual workers crash, hang, or are killed for exceeding a deadline.
//!
//! # Architecture
//!
//! - **Worker**: one child process; one request line in, one response line out
//! - **WorkerPool**: fixed slots, round-robin selection, background replacement
//!
//! Key design principles:
//!
//! - A dispatch is bounded by a hard deadline; on expiry the process is killed
//! - A dead worker is never reused, only replaced in its slot
//! - Acquisition never waits for a replacement to spawn
//! - Failed dispatches are never retried by the pool
//!
//! # Quick Start
//!
//! ```no_run
//! use procpool::{Request, Response, Result, WorkerCommand, WorkerPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let pool = WorkerPool::builder()
//!         .command(WorkerCommand::new("python").arg("scripts/worker.py"))
//!         .size(4)
//!         .build()?;
//!
//!     let request = Request::new("evaluate_expression").arg("expr", "1 + 1");
//!     let line = pool.submit(&request).await?;
//!     println!("{:?}", Response::parse(&line)?);
//!
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`pool`] | [`WorkerPool`] and its builder |
//! | [`protocol`] | Line protocol message types |
//! | [`worker`] | [`Worker`] process supervision |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Worker pool: slot table, round-robin acquisition, replacement.
///
/// Use [`WorkerPool::builder()`] to create a configured pool.
pub mod pool;

/// Line protocol message types.
pub mod protocol;

/// Worker process supervision.
pub mod worker;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::WorkerId;

// Pool types
pub use pool::{PoolBuilder, PoolStatus, SlotStatus, WorkerPool};

// Protocol types
pub use protocol::{Deadlines, Operation, OperationClass, Request, Response, Text, Value};

// Worker types
pub use worker::{Worker, WorkerCommand};
