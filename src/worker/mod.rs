//! Worker processes.
//!
//! A worker is an external program that reads one JSON request per line
//! on stdin and writes one JSON response per line on stdout.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Worker`] | One supervised process with a deadline-bounded dispatch |
//! | [`WorkerCommand`] | How to launch a worker process |
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use procpool::{Request, Worker, WorkerCommand};
//!
//! # async fn example() -> procpool::Result<()> {
//! let worker = Worker::spawn(&WorkerCommand::new("python").arg("worker.py"))?;
//!
//! let request = Request::new("evaluate_expression").arg("expr", "1 + 1");
//! let line = worker.dispatch(&request, Duration::from_millis(1200)).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Launch configuration for worker processes.
pub mod command;

/// Worker process and dispatch.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::WorkerCommand;
pub use core::Worker;

pub(crate) use core::deadline_from_now;
