//! Worker pool.
//!
//! This module provides the pool that owns every worker and hands them
//! out for dispatch.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WorkerPool`] | Round-robin pool with background replacement |
//! | [`PoolBuilder`] | Fluent configuration builder |
//! | [`PoolStatus`] | Point-in-time snapshot of every slot |
//!
//! # Failure Handling
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Spawn fails during build | [`Error::PoolInit`](crate::Error::PoolInit), no pool |
//! | Dispatch times out or its streams fail | Worker killed, error returned once |
//! | Acquisition meets a dead slot | Slot queued for replacement, scan continues |
//! | Every slot dead | [`Error::Unavailable`](crate::Error::Unavailable) |
//! | Replacement spawn fails | Slot stays dead, retried on the next trigger |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for pool configuration.
pub mod builder;

/// Core pool implementation.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::PoolBuilder;
pub use core::{PoolStatus, SlotStatus, WorkerPool};
