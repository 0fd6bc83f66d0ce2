//! Common types and utilities for the Lyra compiler.
//!
//! This crate provides foundational types used across all lyra crates:
//! - Source spans (`ByteSpan`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, diagnostic codes)
//! - Centralized limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::ByteSpan;

// Diagnostics reported by the flow-analysis core
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes};

// Centralized limits and thresholds
pub mod limits;
