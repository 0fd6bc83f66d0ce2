//! Calls-in-place contract verification.
//!
//! A function-typed parameter may carry an invocation-count contract
//! (`AtMostOnce`, `ExactlyOnce`, `AtLeastOnce`). This analysis counts calls
//! to each contracted parameter along every path, merging path counts into a
//! range, and checks the range against the contract at the function exit.

use crate::driver::{FlowAnalysis, PerNodeFacts};
use lyra_ast::{AstArena, Element, InvocationKind, Param, SymbolId};
use lyra_cfg::{CfgNodeId, CfgNodeKind, ControlFlowGraph};
use lyra_common::ByteSpan;
use lyra_common::diagnostics::{Diagnostic, diagnostic_codes};
use rustc_hash::FxHashMap;

/// Counts saturate here: distinguishing "twice" from "more" never changes a
/// contract verdict.
const MANY: u32 = 2;

/// Inclusive range of invocation counts over the paths reaching a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CallRange {
    pub min: u32,
    pub max: u32,
}

impl CallRange {
    const ZERO: CallRange = CallRange { min: 0, max: 0 };

    fn bump(&mut self) {
        self.min = (self.min + 1).min(MANY);
        self.max = (self.max + 1).min(MANY);
    }

    fn union(&mut self, other: CallRange) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContractFacts {
    counts: FxHashMap<SymbolId, CallRange>,
}

impl ContractFacts {
    pub fn range_of(&self, symbol: SymbolId) -> CallRange {
        self.counts.get(&symbol).copied().unwrap_or(CallRange::ZERO)
    }
}

pub struct ContractAnalysis<'a> {
    arena: &'a AstArena,
    tracked: FxHashMap<SymbolId, InvocationKind>,
}

impl<'a> ContractAnalysis<'a> {
    /// Track every parameter of `params` that declares a contract.
    pub fn new(arena: &'a AstArena, params: &[Param]) -> Self {
        let tracked = params
            .iter()
            .filter_map(|p| p.contract.map(|c| (p.symbol, c)))
            .collect();
        Self { arena, tracked }
    }

    /// Check the merged path counts at the function exit against each
    /// declared contract.
    pub fn check(
        &self,
        graph: &ControlFlowGraph,
        facts: &PerNodeFacts<ContractFacts>,
        file: &str,
    ) -> Vec<Diagnostic> {
        let exit = graph.exit_node();
        let Some(at_exit) = facts.at(exit) else {
            return Vec::new();
        };
        let span = graph
            .node(exit)
            .element
            .and_then(|e| self.arena.get(e))
            .map(Element::span)
            .unwrap_or(ByteSpan::ZERO);

        let mut diagnostics = Vec::new();
        // Deterministic report order regardless of hash iteration.
        let mut contracted: Vec<_> = self.tracked.iter().collect();
        contracted.sort_by_key(|(symbol, _)| symbol.0);
        for (&symbol, &kind) in contracted {
            let range = at_exit.range_of(symbol);
            let violation = match kind {
                InvocationKind::AtMostOnce if range.max > 1 => {
                    Some("contract allows at most one invocation, but a path invokes it more than once")
                }
                InvocationKind::AtLeastOnce if range.min == 0 => {
                    Some("contract requires at least one invocation, but a path never invokes it")
                }
                InvocationKind::ExactlyOnce if range.min == 0 => {
                    Some("contract requires exactly one invocation, but a path never invokes it")
                }
                InvocationKind::ExactlyOnce if range.max > 1 => {
                    Some("contract requires exactly one invocation, but a path invokes it more than once")
                }
                _ => None,
            };
            if let Some(message) = violation {
                diagnostics.push(Diagnostic::error(
                    file,
                    span.start,
                    span.len,
                    message,
                    diagnostic_codes::CONTRACT_VIOLATION,
                ));
            }
        }
        diagnostics
    }
}

impl FlowAnalysis for ContractAnalysis<'_> {
    type Facts = ContractFacts;

    fn initial(&self, _graph: &ControlFlowGraph) -> ContractFacts {
        let counts = self
            .tracked
            .keys()
            .map(|&symbol| (symbol, CallRange::ZERO))
            .collect();
        ContractFacts { counts }
    }

    fn transfer(&self, graph: &ControlFlowGraph, node: CfgNodeId, facts: &mut ContractFacts) {
        let node = graph.node(node);
        if node.kind != CfgNodeKind::FunctionCall {
            return;
        }
        let Some(Element::Call {
            callee: Some(callee),
            ..
        }) = node.element.and_then(|e| self.arena.get(e))
        else {
            return;
        };
        if self.tracked.contains_key(callee) {
            facts.counts.entry(*callee).or_default().bump();
        }
    }

    fn merge(&self, into: &mut ContractFacts, other: &ContractFacts) {
        for (symbol, theirs) in &other.counts {
            into.counts.entry(*symbol).or_default().union(*theirs);
        }
    }
}
