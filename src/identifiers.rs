//! Type-safe identifiers.
//!
//! Newtype wrappers keep worker identities distinct from slot indices
//! and process IDs.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ============================================================================
// WorkerId
// ============================================================================

/// Next worker ID to hand out. Starts at 1 so 0 never names a worker.
static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of one spawned worker.
///
/// Every spawn gets a fresh ID, including replacements for the same slot,
/// so a replaced worker is distinguishable from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Allocates the next process-wide unique worker ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_unique() {
        let a = WorkerId::next();
        let b = WorkerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_next_is_never_zero() {
        assert_ne!(WorkerId::next().as_u64(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerId::from_raw(42).to_string(), "42");
    }
}
