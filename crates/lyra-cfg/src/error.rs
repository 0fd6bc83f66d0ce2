//! Internal-error taxonomy for graph construction.

use lyra_ast::{AstArena, ElementId};
use lyra_common::diagnostics::{Diagnostic, diagnostic_codes};
use std::fmt;

/// Fatal construction failure for one function body.
///
/// Always indicates an upstream compiler bug (bad resolution output or a
/// violated builder invariant), never a user error. Sibling bodies are
/// unaffected; the host reports this as an internal-error diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgError {
    MalformedControlFlow { element: ElementId, reason: String },
}

impl CfgError {
    pub fn malformed(element: ElementId, reason: impl Into<String>) -> Self {
        CfgError::MalformedControlFlow {
            element,
            reason: reason.into(),
        }
    }

    /// Convert into the internal-error diagnostic surfaced to the host.
    pub fn to_diagnostic(&self, file: &str, arena: &AstArena) -> Diagnostic {
        match self {
            CfgError::MalformedControlFlow { element, reason } => {
                let span = arena
                    .get(*element)
                    .map(|e| e.span())
                    .unwrap_or(lyra_common::ByteSpan::ZERO);
                Diagnostic::error(
                    file,
                    span.start,
                    span.len,
                    format!("internal error: malformed control flow: {reason}"),
                    diagnostic_codes::MALFORMED_CONTROL_FLOW,
                )
            }
        }
    }
}

impl fmt::Display for CfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgError::MalformedControlFlow { element, reason } => {
                write!(f, "malformed control flow at element {}: {reason}", element.0)
            }
        }
    }
}

impl std::error::Error for CfgError {}
