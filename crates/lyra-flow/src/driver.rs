//! The generic worklist fixed-point engine.
//!
//! Consumers implement [`FlowAnalysis`]; the driver owns everything else:
//! iteration order, change detection, re-enqueueing, and the convergence
//! bound. Facts flow forward along every edge that carries flow (Normal,
//! Branch, Exceptional); Dead edges are skipped, as are nodes the sealed
//! graph marked unreachable.

use lyra_cfg::{BranchLabel, CfgNodeId, ControlFlowGraph, EdgeKind};
use lyra_common::diagnostics::{Diagnostic, diagnostic_codes};
use lyra_common::limits::{FIXPOINT_WORKLIST_CAPACITY, MAX_FIXPOINT_PASSES};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

/// A forward data-flow analysis over a sealed [`ControlFlowGraph`].
///
/// `merge` must be associative, commutative, and idempotent, and the fact
/// lattice must have finite height, or the run will not converge.
pub trait FlowAnalysis {
    type Facts: Clone + PartialEq;

    /// Facts holding at the graph's enter node.
    fn initial(&self, graph: &ControlFlowGraph) -> Self::Facts;

    /// Apply one node's effect to the facts flowing through it.
    fn transfer(&self, graph: &ControlFlowGraph, node: CfgNodeId, facts: &mut Self::Facts);

    /// Combine facts arriving at a join point.
    fn merge(&self, into: &mut Self::Facts, other: &Self::Facts);

    /// Refine facts along a labeled branch edge. `source` is the condition
    /// node the edge leaves; the default keeps the facts unchanged.
    fn branch(
        &self,
        _graph: &ControlFlowGraph,
        _source: CfgNodeId,
        _label: BranchLabel,
        _facts: &mut Self::Facts,
    ) {
    }

    /// Invalidate facts whose originating scope closed. Called when flow
    /// crosses from a deeper node into one at `level`.
    fn close_scopes(&self, _level: u32, _facts: &mut Self::Facts) {}
}

/// Facts at the *entry* of every reachable node, as computed by [`run`].
///
/// Node entry facts exclude the node's own transfer effect; they are what a
/// consumer wants when asking "what is known when execution arrives here".
#[derive(Debug)]
pub struct PerNodeFacts<F> {
    facts: Vec<Option<F>>,
}

impl<F> PerNodeFacts<F> {
    /// Facts at the node's entry, or `None` if no flow ever reaches it.
    pub fn at(&self, node: CfgNodeId) -> Option<&F> {
        self.facts.get(node.index()).and_then(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<F: PartialEq> PartialEq for PerNodeFacts<F> {
    fn eq(&self, other: &Self) -> bool {
        self.facts == other.facts
    }
}

/// Fatal analysis failure for one body. Like graph construction errors this
/// is an internal error, never a user-facing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The worklist exceeded `MAX_FIXPOINT_PASSES` visits per node, which
    /// means a consumer's transfer/merge pair oscillates.
    NonConvergence { limit: usize },
}

impl AnalysisError {
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        match self {
            AnalysisError::NonConvergence { limit } => Diagnostic::error(
                file,
                0,
                0,
                format!("internal error: flow analysis did not converge within {limit} passes"),
                diagnostic_codes::ANALYSIS_NON_CONVERGENCE,
            ),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::NonConvergence { limit } => {
                write!(f, "flow analysis did not converge within {limit} passes")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Run `analysis` to a fixed point over `graph`.
///
/// Nodes are seeded and revisited in FIFO order starting from the enter
/// node, so two runs over the same graph produce identical results. A
/// successor is re-enqueued only when the facts arriving at it actually
/// changed.
#[tracing::instrument(level = "trace", skip_all, fields(nodes = graph.len()))]
pub fn run<A: FlowAnalysis>(
    graph: &ControlFlowGraph,
    analysis: &A,
) -> Result<PerNodeFacts<A::Facts>, AnalysisError> {
    let mut facts: Vec<Option<A::Facts>> = (0..graph.len()).map(|_| None).collect();
    let enter = graph.enter_node();
    if enter.is_none() {
        return Ok(PerNodeFacts { facts });
    }
    facts[enter.index()] = Some(analysis.initial(graph));

    let mut worklist: VecDeque<CfgNodeId> = VecDeque::with_capacity(FIXPOINT_WORKLIST_CAPACITY);
    let mut queued: FxHashSet<CfgNodeId> = FxHashSet::default();
    worklist.push_back(enter);
    queued.insert(enter);

    let budget = graph.len().saturating_mul(MAX_FIXPOINT_PASSES);
    let mut processed = 0usize;

    while let Some(node) = worklist.pop_front() {
        queued.remove(&node);
        processed += 1;
        if processed > budget {
            return Err(AnalysisError::NonConvergence {
                limit: MAX_FIXPOINT_PASSES,
            });
        }
        if graph.is_unreachable(node) {
            continue;
        }
        let Some(entry) = facts[node.index()].clone() else {
            continue;
        };
        let mut out = entry;
        analysis.transfer(graph, node, &mut out);

        let level = graph.node(node).level;
        for edge in &graph.node(node).outgoing {
            if !edge.kind.carries_flow() || graph.is_unreachable(edge.node) {
                continue;
            }
            let mut carried = out.clone();
            if let EdgeKind::Branch(label) = edge.kind {
                analysis.branch(graph, node, label, &mut carried);
            }
            let target_level = graph.node(edge.node).level;
            if target_level < level {
                analysis.close_scopes(target_level, &mut carried);
            }
            let slot = &mut facts[edge.node.index()];
            let changed = match slot {
                None => {
                    *slot = Some(carried);
                    true
                }
                Some(existing) => {
                    let before = existing.clone();
                    analysis.merge(existing, &carried);
                    *existing != before
                }
            };
            if changed && queued.insert(edge.node) {
                worklist.push_back(edge.node);
            }
        }
    }

    trace!(processed, "fixed point reached");
    Ok(PerNodeFacts { facts })
}
