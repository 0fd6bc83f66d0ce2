//! Centralized limits and thresholds for the Lyra compiler.
//!
//! This module provides shared constants for operation counts and capacity
//! limits used throughout the codebase. Centralizing these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Documents the rationale for each limit

// =============================================================================
// Operation Count Limits (Flow Analysis)
// =============================================================================

/// Maximum number of times any single graph node may be reprocessed by the
/// fixed-point driver before the run is abandoned.
///
/// A correct analysis whose fact lattice has finite height and whose merge is
/// monotone always stabilizes in far fewer passes; hitting this bound means a
/// consumer's `transfer`/`merge` pair is oscillating, which is reported as an
/// internal error rather than looping forever.
pub const MAX_FIXPOINT_PASSES: usize = 64;

/// Pre-allocation size for the per-graph work list.
pub const FIXPOINT_WORKLIST_CAPACITY: usize = 128;
