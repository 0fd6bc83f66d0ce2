//! Diagnostics produced by the flow-analysis core.
//!
//! The core itself never prints; it hands `Diagnostic` values to the host
//! compiler, which renders or serializes them.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

/// Diagnostic codes emitted by this core.
pub mod diagnostic_codes {
    /// Unreachable code detected after a jump or non-returning call.
    pub const UNREACHABLE_CODE: u32 = 5301;
    /// A variable is read before it is definitely assigned.
    pub const USE_BEFORE_ASSIGNMENT: u32 = 5454;
    /// A calls-in-place contract on a parameter is not satisfied.
    pub const CONTRACT_VIOLATION: u32 = 5460;
    /// Internal error: the control flow graph is malformed.
    pub const MALFORMED_CONTROL_FLOW: u32 = 9001;
    /// Internal error: a flow analysis failed to reach a fixed point.
    pub const ANALYSIS_NON_CONVERGENCE: u32 = 9002;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
            related_information: Vec::new(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
            related_information: Vec::new(),
        }
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            category: DiagnosticCategory::Message,
            code: 0,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        });
        self
    }
}
