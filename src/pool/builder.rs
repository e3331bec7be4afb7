//! Builder pattern for pool configuration.
//!
//! Provides a fluent API for configuring and creating [`WorkerPool`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use procpool::{WorkerCommand, WorkerPool};
//!
//! # async fn example() -> procpool::Result<()> {
//! let pool = WorkerPool::builder()
//!     .command(WorkerCommand::new("python").arg("worker.py"))
//!     .size(4)
//!     .health_interval(Duration::from_secs(30))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::Deadlines;
use crate::worker::WorkerCommand;

use super::core::{PoolConfig, WorkerPool};

// ============================================================================
// Constants
// ============================================================================

/// Default number of workers.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Default period between health sweeps.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

// ============================================================================
// PoolBuilder
// ============================================================================

/// Builder for configuring a [`WorkerPool`] instance.
///
/// Use [`WorkerPool::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    /// How to launch each worker.
    command: Option<WorkerCommand>,
    /// Number of slots.
    size: usize,
    /// Period of the health sweep.
    health_interval: Duration,
    /// Per-class dispatch deadlines.
    deadlines: Deadlines,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            command: None,
            size: DEFAULT_POOL_SIZE,
            health_interval: DEFAULT_HEALTH_INTERVAL,
            deadlines: Deadlines::default(),
        }
    }
}

// ============================================================================
// PoolBuilder Implementation
// ============================================================================

impl PoolBuilder {
    /// Creates a new builder with default settings and no command.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command used to launch every worker.
    #[inline]
    #[must_use]
    pub fn command(mut self, command: WorkerCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Sets the number of workers. Must be at least 1.
    #[inline]
    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Sets the period between health sweeps.
    #[inline]
    #[must_use]
    pub fn health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    /// Sets the per-class deadlines used by [`WorkerPool::submit`].
    #[inline]
    #[must_use]
    pub fn deadlines(mut self, deadlines: Deadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    /// Validates the configuration, spawns every worker and starts the
    /// background tasks.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no command is set or a setting is out of range
    /// - [`Error::PoolInit`] if any worker fails to spawn
    pub fn build(self) -> Result<WorkerPool> {
        let config = self.validate()?;
        WorkerPool::start(config)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl PoolBuilder {
    /// Checks every setting and produces the pool configuration.
    fn validate(self) -> Result<PoolConfig> {
        let command = self.command.ok_or_else(|| {
            Error::config(
                "Worker command is required. Use .command() to set it.\n\
                 Example: WorkerPool::builder().command(WorkerCommand::new(\"python\"))",
            )
        })?;

        if self.size == 0 {
            return Err(Error::config("Pool size must be at least 1"));
        }

        if self.health_interval.is_zero() {
            return Err(Error::config("Health interval must be greater than zero"));
        }

        let deadlines = self.deadlines;
        if deadlines.standard.is_zero() || deadlines.graph.is_zero() || deadlines.graph_3d.is_zero()
        {
            return Err(Error::config("Deadlines must be greater than zero"));
        }

        Ok(PoolConfig {
            command,
            size: self.size,
            health_interval: self.health_interval,
            deadlines,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> WorkerCommand {
        WorkerCommand::new("sh").arg("-c").arg("cat")
    }

    #[test]
    fn test_new_uses_defaults() {
        let builder = PoolBuilder::new();
        assert!(builder.command.is_none());
        assert_eq!(builder.size, 4);
        assert_eq!(builder.health_interval, Duration::from_secs(30));
        assert_eq!(builder.deadlines, Deadlines::default());
    }

    #[test]
    fn test_setters() {
        let builder = PoolBuilder::new()
            .command(echo())
            .size(2)
            .health_interval(Duration::from_millis(250));

        assert_eq!(builder.command, Some(echo()));
        assert_eq!(builder.size, 2);
        assert_eq!(builder.health_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_build_fails_without_command() {
        let err = PoolBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn test_build_fails_with_zero_size() {
        let err = PoolBuilder::new().command(echo()).size(0).build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_build_fails_with_zero_interval() {
        let err = PoolBuilder::new()
            .command(echo())
            .health_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Health interval"));
    }

    #[test]
    fn test_build_fails_with_zero_deadline() {
        let deadlines = Deadlines {
            graph: Duration::ZERO,
            ..Deadlines::default()
        };
        let err = PoolBuilder::new()
            .command(echo())
            .deadlines(deadlines)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Deadlines"));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = PoolBuilder::new().size(3);
        let cloned = builder.clone();
        assert_eq!(builder.size, cloned.size);
    }
}
