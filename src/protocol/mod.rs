//! Worker line protocol message types.
//!
//! This module defines the message format exchanged with a worker process
//! over its standard streams.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Pool → Worker | One operation with arguments |
//! | `Response` | Worker → Pool | Result, failure or fault |
//!
//! Each message is exactly one line of compact JSON. The worker answers
//! every request line with exactly one response line, strictly in order.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `operation` | Operation catalogue and deadline classes |
//! | `request` | Request and Response types |
//! | `value` | Structured argument values |

// ============================================================================
// Submodules
// ============================================================================

/// Operation catalogue and deadline classes.
pub mod operation;

/// Request and Response message types.
pub mod request;

/// Structured argument values.
pub mod value;

// ============================================================================
// Re-exports
// ============================================================================

pub use operation::{Deadlines, Operation, OperationClass};
pub use request::{Request, Response, Text, encode_line};
pub use value::Value;
