//! Unreachable-code reporting.
//!
//! The sealed graph already knows which nodes execution can never reach;
//! this module turns that set into warnings, collapsing each contiguous run
//! of unreachable nodes into a single diagnostic covering its source range.

use lyra_ast::AstArena;
use lyra_cfg::{CfgNodeId, ControlFlowGraph};
use lyra_common::ByteSpan;
use lyra_common::diagnostics::{Diagnostic, diagnostic_codes};

pub struct ReachabilityReporter<'a> {
    graph: &'a ControlFlowGraph,
    arena: &'a AstArena,
}

impl<'a> ReachabilityReporter<'a> {
    pub const fn new(graph: &'a ControlFlowGraph, arena: &'a AstArena) -> Self {
        Self { graph, arena }
    }

    pub fn is_reachable(&self, node: CfgNodeId) -> bool {
        !self.graph.is_unreachable(node)
    }

    pub fn unreachable_count(&self) -> usize {
        self.graph.unreachable_nodes().len()
    }

    pub fn has_unreachable_code(&self) -> bool {
        !self.graph.unreachable_nodes().is_empty()
    }

    /// One warning per contiguous unreachable region, in node insertion
    /// order (which follows source order). Purely structural nodes widen no
    /// span; a region containing only structural nodes is not reported.
    pub fn report(&self, file: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut region: Option<ByteSpan> = None;
        for (id, node) in self.graph.iter() {
            if self.graph.is_unreachable(id) {
                if let Some(span) = node
                    .element
                    .and_then(|e| self.arena.get(e))
                    .map(|e| e.span())
                {
                    region = Some(match region {
                        Some(r) => r.cover(span),
                        None => span,
                    });
                }
            } else if let Some(span) = region.take() {
                diagnostics.push(Self::warn(file, span));
            }
        }
        if let Some(span) = region {
            diagnostics.push(Self::warn(file, span));
        }
        diagnostics
    }

    fn warn(file: &str, span: ByteSpan) -> Diagnostic {
        Diagnostic::warning(
            file,
            span.start,
            span.len,
            "unreachable code",
            diagnostic_codes::UNREACHABLE_CODE,
        )
    }
}
