//! Content hashing: the streaming 64-bit accumulator and the
//! per-object `(time, view) -> hash` cache with parent-propagated
//! invalidation.

/// Per-object hash cache arena with invalidation propagation.
pub mod graph;
/// Streaming 64-bit hash accumulator.
pub mod hasher;
