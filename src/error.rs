//! Error types for the worker pool.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use procpool::{Result, WorkerPool};
//!
//! async fn example(pool: &WorkerPool) -> Result<Vec<u8>> {
//!     let worker = pool.acquire()?;
//!     worker.dispatch(&payload, Duration::from_millis(1200)).await
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Worker | [`Error::AlreadyDead`], [`Error::Transport`], [`Error::Timeout`] |
//! | Pool | [`Error::PoolInit`], [`Error::Unavailable`], [`Error::PoolClosed`] |
//! | Configuration | [`Error::Config`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::WorkerId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Worker Errors
    // ========================================================================
    /// Worker was already dead before any I/O was attempted.
    ///
    /// Mostly guards the race between acquisition and a concurrent failure.
    #[error("Worker {worker_id} is dead")]
    AlreadyDead {
        /// The dead worker.
        worker_id: WorkerId,
    },

    /// Write or read failure on the worker's byte streams.
    ///
    /// Always fatal to the worker instance.
    #[error("Worker {worker_id} transport failed: {message}")]
    Transport {
        /// The worker whose streams failed.
        worker_id: WorkerId,
        /// Description of the failure.
        message: String,
    },

    /// Deadline exceeded; the worker process was killed.
    #[error("Worker {worker_id} timed out after {timeout_ms}ms and was killed")]
    Timeout {
        /// The killed worker.
        worker_id: WorkerId,
        /// Milliseconds waited before the kill.
        timeout_ms: u64,
    },

    // ========================================================================
    // Pool Errors
    // ========================================================================
    /// A worker could not be spawned while constructing the pool.
    #[error("Failed to start worker pool (slot {slot}): {message}")]
    PoolInit {
        /// Slot index whose spawn failed.
        slot: usize,
        /// Description of the spawn failure.
        message: String,
    },

    /// Every slot was dead at acquisition time.
    ///
    /// Replacements have been scheduled; retry after a backoff.
    #[error("No available workers ({size} slots, all dead)")]
    Unavailable {
        /// Number of slots in the pool.
        size: usize,
    },

    /// The pool has been shut down.
    #[error("Worker pool is shut down")]
    PoolClosed,

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when pool or worker configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an already-dead error.
    #[inline]
    pub fn already_dead(worker_id: WorkerId) -> Self {
        Self::AlreadyDead { worker_id }
    }

    /// Creates a transport error.
    #[inline]
    pub fn transport(worker_id: WorkerId, message: impl Into<String>) -> Self {
        Self::Transport {
            worker_id,
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(worker_id: WorkerId, timeout_ms: u64) -> Self {
        Self::Timeout {
            worker_id,
            timeout_ms,
        }
    }

    /// Creates a pool initialization error.
    #[inline]
    pub fn pool_init(slot: usize, message: impl Into<String>) -> Self {
        Self::PoolInit {
            slot,
            message: message.into(),
        }
    }

    /// Creates an unavailable error.
    #[inline]
    pub fn unavailable(size: usize) -> Self {
        Self::Unavailable { size }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this error killed or found a dead worker.
    #[inline]
    #[must_use]
    pub fn is_worker_fault(&self) -> bool {
        matches!(
            self,
            Self::AlreadyDead { .. } | Self::Transport { .. } | Self::Timeout { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry against another worker.
    /// A timeout is not: the same request would most likely time out again.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyDead { .. } | Self::Transport { .. } | Self::Unavailable { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::transport(WorkerId::from_raw(7), "broken pipe");
        assert_eq!(err.to_string(), "Worker 7 transport failed: broken pipe");
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::timeout(WorkerId::from_raw(3), 1200);
        assert_eq!(
            err.to_string(),
            "Worker 3 timed out after 1200ms and was killed"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("pool size must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: pool size must be at least 1"
        );
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout(WorkerId::from_raw(1), 5000);
        let other_err = Error::transport(WorkerId::from_raw(1), "eof");

        assert!(timeout_err.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_worker_fault() {
        let id = WorkerId::from_raw(1);

        assert!(Error::already_dead(id).is_worker_fault());
        assert!(Error::transport(id, "eof").is_worker_fault());
        assert!(Error::timeout(id, 10).is_worker_fault());
        assert!(!Error::unavailable(4).is_worker_fault());
        assert!(!Error::PoolClosed.is_worker_fault());
    }

    #[test]
    fn test_is_recoverable() {
        let id = WorkerId::from_raw(1);

        assert!(Error::unavailable(4).is_recoverable());
        assert!(Error::transport(id, "eof").is_recoverable());
        assert!(!Error::timeout(id, 1000).is_recoverable());
        assert!(!Error::pool_init(0, "spawn failed").is_recoverable());
        assert!(!Error::config("test").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
