//! Per-symbol non-null narrowing.
//!
//! A symbol becomes known non-null on the branch edge of a condition that
//! proves it (`x != null` taken true, `x is T` taken true, and conjunctions
//! of those). Assigning to the symbol kills the fact, as does leaving the
//! scope the condition was evaluated in. Joins intersect: a symbol is
//! non-null after a join only if every arriving path proved it.

use crate::driver::FlowAnalysis;
use lyra_ast::{AstArena, Element, ElementId, LogicOp, SymbolId};
use lyra_cfg::{BranchLabel, CfgNodeId, CfgNodeKind, ControlFlowGraph};
use rustc_hash::FxHashMap;

/// Set of symbols currently known non-null, each tagged with the level of
/// the node that established it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NullnessFacts {
    non_null: FxHashMap<SymbolId, u32>,
}

impl NullnessFacts {
    pub fn is_non_null(&self, symbol: SymbolId) -> bool {
        self.non_null.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.non_null.len()
    }

    pub fn is_empty(&self) -> bool {
        self.non_null.is_empty()
    }
}

pub struct NullnessAnalysis<'a> {
    arena: &'a AstArena,
}

impl<'a> NullnessAnalysis<'a> {
    pub const fn new(arena: &'a AstArena) -> Self {
        Self { arena }
    }

    /// Interpret a condition element under the assumption it evaluated to
    /// `outcome`, recursing through short-circuit operators.
    fn refine(&self, element: ElementId, outcome: bool, level: u32, facts: &mut NullnessFacts) {
        match self.arena.get(element) {
            Some(Element::NullTest {
                operand,
                expects_non_null,
                ..
            }) => {
                if outcome == *expects_non_null {
                    facts.non_null.insert(*operand, level);
                } else {
                    // The condition proved the symbol IS null here.
                    facts.non_null.remove(operand);
                }
            }
            Some(Element::TypeTest {
                operand, negated, ..
            }) => {
                // A successful type test implies the value exists.
                if outcome != *negated {
                    facts.non_null.insert(*operand, level);
                }
            }
            Some(Element::BinaryLogic {
                op, left, right, ..
            }) => match (op, outcome) {
                (LogicOp::And, true) => {
                    self.refine(*left, true, level, facts);
                    self.refine(*right, true, level, facts);
                }
                (LogicOp::Or, false) => {
                    self.refine(*left, false, level, facts);
                    self.refine(*right, false, level, facts);
                }
                // A false `&&` or a true `||` pins down neither operand.
                _ => {}
            },
            _ => {}
        }
    }

    fn killed_symbol(&self, element: ElementId) -> Option<SymbolId> {
        match self.arena.get(element) {
            Some(Element::Assignment { target, .. }) => Some(*target),
            Some(Element::VarDecl { symbol, .. }) => Some(*symbol),
            _ => None,
        }
    }
}

impl FlowAnalysis for NullnessAnalysis<'_> {
    type Facts = NullnessFacts;

    fn initial(&self, _graph: &ControlFlowGraph) -> NullnessFacts {
        NullnessFacts::default()
    }

    fn transfer(&self, graph: &ControlFlowGraph, node: CfgNodeId, facts: &mut NullnessFacts) {
        let node = graph.node(node);
        if matches!(
            node.kind,
            CfgNodeKind::VariableAssignment | CfgNodeKind::VariableDeclaration
        ) {
            // A write may store null; the fact does not survive it.
            if let Some(symbol) = node.element.and_then(|e| self.killed_symbol(e)) {
                facts.non_null.remove(&symbol);
            }
        }
    }

    fn merge(&self, into: &mut NullnessFacts, other: &NullnessFacts) {
        // Intersection; a fact proved at different depths on the two paths
        // keeps the deeper tag so it dies with the shorter-lived scope.
        into.non_null.retain(|symbol, level| {
            if let Some(other_level) = other.non_null.get(symbol) {
                *level = (*level).max(*other_level);
                true
            } else {
                false
            }
        });
    }

    fn branch(
        &self,
        graph: &ControlFlowGraph,
        source: CfgNodeId,
        label: BranchLabel,
        facts: &mut NullnessFacts,
    ) {
        let BranchLabel::Bool(outcome) = label else {
            return;
        };
        let node = graph.node(source);
        let Some(element) = node.element else {
            return;
        };
        match node.kind {
            CfgNodeKind::WhenBranchConditionExit | CfgNodeKind::LoopConditionExit => {
                self.refine(element, outcome, node.level, facts);
            }
            // The left-operand exit carries the whole operator element; only
            // the left side's outcome is decided at this point.
            CfgNodeKind::BinaryAndExitLeftOperand | CfgNodeKind::BinaryOrExitLeftOperand => {
                if let Some(Element::BinaryLogic { left, .. }) = self.arena.get(element) {
                    self.refine(*left, outcome, node.level, facts);
                }
            }
            _ => {}
        }
    }

    fn close_scopes(&self, level: u32, facts: &mut NullnessFacts) {
        facts.non_null.retain(|_, fact_level| *fact_level <= level);
    }
}
