//! Definite-assignment analysis.
//!
//! Tracks, per declared symbol, whether every path reaching a node has
//! assigned it. Reads of symbols that are not definitely assigned become
//! use-before-assignment diagnostics.

use crate::driver::{FlowAnalysis, PerNodeFacts};
use lyra_ast::{AstArena, Element, SymbolId};
use lyra_cfg::{CfgNodeId, CfgNodeKind, ControlFlowGraph};
use lyra_common::diagnostics::{Diagnostic, diagnostic_codes};
use rustc_hash::FxHashMap;

/// Three-point assignment lattice.
///
/// `MaybeAssigned` is the join of disagreeing paths: at least one path
/// assigned the symbol and at least one did not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignmentState {
    Unassigned,
    MaybeAssigned,
    DefinitelyAssigned,
}

impl AssignmentState {
    const fn join(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unassigned, Self::Unassigned) => Self::Unassigned,
            (Self::DefinitelyAssigned, Self::DefinitelyAssigned) => Self::DefinitelyAssigned,
            _ => Self::MaybeAssigned,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssignmentFacts {
    states: FxHashMap<SymbolId, AssignmentState>,
}

impl AssignmentFacts {
    /// `None` for symbols not declared on any path reaching this point.
    pub fn state_of(&self, symbol: SymbolId) -> Option<AssignmentState> {
        self.states.get(&symbol).copied()
    }
}

pub struct AssignmentAnalysis<'a> {
    arena: &'a AstArena,
}

impl<'a> AssignmentAnalysis<'a> {
    pub const fn new(arena: &'a AstArena) -> Self {
        Self { arena }
    }

    /// Report every read of a declared symbol that is not definitely
    /// assigned at the read. Unreachable reads are skipped; they are covered
    /// by the unreachable-code warning instead.
    pub fn check(
        &self,
        graph: &ControlFlowGraph,
        facts: &PerNodeFacts<AssignmentFacts>,
        file: &str,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (id, node) in graph.iter() {
            if node.kind != CfgNodeKind::QualifiedAccess || node.is_unreachable() {
                continue;
            }
            let Some(element) = node.element else {
                continue;
            };
            let Some(Element::QualifiedAccess { symbol, span, .. }) = self.arena.get(element)
            else {
                continue;
            };
            let Some(entry) = facts.at(id) else {
                continue;
            };
            match entry.state_of(*symbol) {
                Some(AssignmentState::Unassigned) => {
                    diagnostics.push(Diagnostic::error(
                        file,
                        span.start,
                        span.len,
                        "variable is used before being assigned",
                        diagnostic_codes::USE_BEFORE_ASSIGNMENT,
                    ));
                }
                Some(AssignmentState::MaybeAssigned) => {
                    diagnostics.push(Diagnostic::error(
                        file,
                        span.start,
                        span.len,
                        "variable may be used before being assigned",
                        diagnostic_codes::USE_BEFORE_ASSIGNMENT,
                    ));
                }
                // Definitely assigned, or not a tracked local.
                _ => {}
            }
        }
        diagnostics
    }
}

impl FlowAnalysis for AssignmentAnalysis<'_> {
    type Facts = AssignmentFacts;

    fn initial(&self, _graph: &ControlFlowGraph) -> AssignmentFacts {
        AssignmentFacts::default()
    }

    fn transfer(&self, graph: &ControlFlowGraph, node: CfgNodeId, facts: &mut AssignmentFacts) {
        let node = graph.node(node);
        let Some(element) = node.element else {
            return;
        };
        match node.kind {
            CfgNodeKind::VariableDeclaration => {
                if let Some(Element::VarDecl {
                    symbol,
                    initializer,
                    ..
                }) = self.arena.get(element)
                {
                    let state = if initializer.is_some() {
                        AssignmentState::DefinitelyAssigned
                    } else {
                        AssignmentState::Unassigned
                    };
                    facts.states.insert(*symbol, state);
                }
            }
            CfgNodeKind::VariableAssignment => {
                if let Some(Element::Assignment { target, .. }) = self.arena.get(element) {
                    facts
                        .states
                        .insert(*target, AssignmentState::DefinitelyAssigned);
                }
            }
            _ => {}
        }
    }

    fn merge(&self, into: &mut AssignmentFacts, other: &AssignmentFacts) {
        // A symbol missing from one side was never declared on that path;
        // treat it as unassigned there.
        for (symbol, theirs) in &other.states {
            let state = into
                .states
                .entry(*symbol)
                .or_insert(AssignmentState::Unassigned);
            *state = state.join(*theirs);
        }
        for (symbol, state) in &mut into.states {
            if !other.states.contains_key(symbol) {
                *state = state.join(AssignmentState::Unassigned);
            }
        }
    }
}
