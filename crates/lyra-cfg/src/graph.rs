//! The control flow graph: nodes, edges, and the owning container.
//!
//! Nodes live in the graph's vector arena and reference each other only by
//! [`CfgNodeId`], never by pointer, so the graph alone owns all memory and
//! can be moved or dropped as a unit. Back-edges (loops) and the speculative
//! main-block-to-catch edges introduce no ownership cycles.

use lyra_ast::ElementId;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Index of a node in a [`ControlFlowGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CfgNodeId(pub u32);

impl CfgNodeId {
    pub const NONE: CfgNodeId = CfgNodeId(u32::MAX);

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// The label on a conditional branch edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BranchLabel {
    /// Condition outcome: the true or false successor of a condition exit.
    Bool(bool),
    /// A `when` case discriminator.
    Case(u32),
}

/// Edge classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Ordinary sequential control transfer.
    Normal,
    /// Kept for diagnostics only; control can never take this edge.
    Dead,
    /// Speculative transfer from a try main block into a catch clause.
    Exceptional,
    /// Conditional transfer labeled with the branch outcome.
    Branch(BranchLabel),
}

impl EdgeKind {
    /// Whether execution (and therefore facts) can flow along this edge.
    pub const fn carries_flow(self) -> bool {
        !matches!(self, EdgeKind::Dead)
    }
}

/// A directed connection to another node. Stored on both endpoints: `node`
/// is the target for outgoing edges and the source for incoming edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub node: CfgNodeId,
    pub kind: EdgeKind,
}

/// The closed node taxonomy.
///
/// Enter/exit pairs exist for every compound construct; leaf kinds cover
/// single evaluation steps. Pattern matching over this tag replaces virtual
/// dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CfgNodeKind {
    FunctionEnter,
    FunctionExit,
    BlockEnter,
    BlockExit,
    WhenEnter,
    WhenExit,
    WhenBranchConditionEnter,
    WhenBranchConditionExit,
    WhenBranchResultEnter,
    WhenBranchResultExit,
    LoopEnter,
    LoopExit,
    LoopConditionEnter,
    LoopConditionExit,
    LoopBlockEnter,
    LoopBlockExit,
    BinaryAndEnter,
    BinaryAndExitLeftOperand,
    BinaryAndExit,
    BinaryOrEnter,
    BinaryOrExitLeftOperand,
    BinaryOrExit,
    TryEnter,
    TryExit,
    TryMainBlockEnter,
    TryMainBlockExit,
    CatchClauseEnter,
    CatchClauseExit,
    FinallyBlockEnter,
    FinallyBlockExit,
    FinallyProxyEnter,
    FinallyProxyExit,
    Jump,
    ConstExpression,
    VariableDeclaration,
    VariableAssignment,
    QualifiedAccess,
    FunctionCall,
    NullTest,
    TypeTest,
    Stub,
}

/// One evaluation step of one syntax-tree element.
#[derive(Debug)]
pub struct CfgNode {
    pub kind: CfgNodeKind,
    /// The element that produced this node; absent for purely structural
    /// nodes (stub, finally proxies).
    pub element: Option<ElementId>,
    /// Lexical nesting depth of the builder when the node was created.
    /// Consumers use this to invalidate facts whose originating scope closed.
    pub level: u32,
    pub outgoing: SmallVec<[Edge; 2]>,
    pub incoming: SmallVec<[Edge; 2]>,
    unreachable: bool,
}

impl CfgNode {
    /// Whether `finalize()` determined this node cannot be reached from the
    /// graph's enter node.
    pub const fn is_unreachable(&self) -> bool {
        self.unreachable
    }
}

/// Owns the full node/edge set for one function-like body.
///
/// Created empty, populated in one pass by the builder, then sealed by
/// [`ControlFlowGraph::finalize`] and handed read-only to analyses.
#[derive(Debug)]
pub struct ControlFlowGraph {
    nodes: Vec<CfgNode>,
    enter_node: CfgNodeId,
    exit_node: CfgNodeId,
    unreachable_nodes: FxHashSet<CfgNodeId>,
    sealed: bool,
}

impl ControlFlowGraph {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            enter_node: CfgNodeId::NONE,
            exit_node: CfgNodeId::NONE,
            unreachable_nodes: FxHashSet::default(),
            sealed: false,
        }
    }

    pub(crate) fn create_node(
        &mut self,
        kind: CfgNodeKind,
        element: Option<ElementId>,
        level: u32,
    ) -> CfgNodeId {
        debug_assert!(!self.sealed, "node created on a sealed graph");
        let id = CfgNodeId(self.nodes.len() as u32);
        self.nodes.push(CfgNode {
            kind,
            element,
            level,
            outgoing: SmallVec::new(),
            incoming: SmallVec::new(),
            unreachable: false,
        });
        id
    }

    /// Add a directed edge. Edges are immutable once created; a Normal edge
    /// incident to a node already known unreachable is recorded Dead instead.
    pub(crate) fn connect(&mut self, from: CfgNodeId, to: CfgNodeId, kind: EdgeKind) {
        let kind = if kind == EdgeKind::Normal
            && (self.nodes[from.index()].unreachable || self.nodes[to.index()].unreachable)
        {
            EdgeKind::Dead
        } else {
            kind
        };
        self.nodes[from.index()].outgoing.push(Edge { node: to, kind });
        self.nodes[to.index()].incoming.push(Edge { node: from, kind });
    }

    pub(crate) fn set_enter(&mut self, id: CfgNodeId) {
        debug_assert!(self.enter_node.is_none(), "enter node set twice");
        self.enter_node = id;
    }

    pub(crate) fn set_exit(&mut self, id: CfgNodeId) {
        debug_assert!(self.exit_node.is_none(), "exit node set twice");
        self.exit_node = id;
    }

    pub fn node(&self, id: CfgNodeId) -> &CfgNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: CfgNodeId) -> Option<&CfgNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order, which is also approximate evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (CfgNodeId, &CfgNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (CfgNodeId(i as u32), n))
    }

    /// The unique node with no incoming edges; the first node created.
    pub fn enter_node(&self) -> CfgNodeId {
        self.enter_node
    }

    /// The unique normal-completion convergence point. Jump nodes connect to
    /// it directly, bypassing intermediate exits.
    pub fn exit_node(&self) -> CfgNodeId {
        self.exit_node
    }

    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub const fn unreachable_nodes(&self) -> &FxHashSet<CfgNodeId> {
        &self.unreachable_nodes
    }

    pub fn is_unreachable(&self, id: CfgNodeId) -> bool {
        self.get(id).is_some_and(|n| n.unreachable)
    }

    /// Seal the graph: compute the set of nodes not reachable from the enter
    /// node by Normal/Branch/Exceptional edges.
    ///
    /// A pure function of the edge set; calling it again recomputes the same
    /// result.
    pub fn finalize(&mut self) {
        self.unreachable_nodes.clear();
        let mut visited = vec![false; self.nodes.len()];
        if !self.enter_node.is_none() {
            let mut worklist = vec![self.enter_node];
            while let Some(id) = worklist.pop() {
                if std::mem::replace(&mut visited[id.index()], true) {
                    continue;
                }
                for edge in &self.nodes[id.index()].outgoing {
                    if edge.kind.carries_flow() && !visited[edge.node.index()] {
                        worklist.push(edge.node);
                    }
                }
            }
        }
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.unreachable = !visited[i];
            if node.unreachable {
                self.unreachable_nodes.insert(CfgNodeId(i as u32));
            }
        }
        self.sealed = true;
    }
}
