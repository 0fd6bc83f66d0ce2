//! Recursive, structure-driven graph construction.
//!
//! One [`CfgBuilder`] builds one graph for one function-like body in a
//! single depth-first pass. All construction state (level counter, loop and
//! finally context stacks) lives in the builder struct and is passed by
//! exclusive reference through the recursive build routines, so independent
//! bodies can be built in parallel with no shared mutable state.
//!
//! Wiring rules:
//! - Plain expressions produce a single node chained after their operand
//!   nodes in evaluation order (operands left-to-right, innermost first).
//! - Each statement's exit connects Normal to the next statement's first
//!   node; a jump terminates the path and the lexically following node is
//!   connected from the jump with a Dead edge instead.
//! - Compound constructs (`when`, loops, short-circuit operators,
//!   try/catch/finally) have dedicated routines below.

use crate::error::CfgError;
use crate::graph::{BranchLabel, CfgNodeId, CfgNodeKind, ControlFlowGraph, EdgeKind};
use lyra_ast::{AstArena, CatchClause, Element, ElementId, JumpKind, LabelId, LogicOp, LoopKind, WhenBranch};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Targets for `break`/`continue` inside the innermost enclosing loops.
struct LoopContext {
    label: Option<LabelId>,
    continue_target: CfgNodeId,
    break_target: CfgNodeId,
    /// Depth of the finally stack when the loop was entered; a jump out of
    /// the loop must pass through every finally pushed above this depth.
    finally_depth: usize,
}

/// A non-local jump captured by an enclosing finally block, to be
/// re-dispatched from the finally's proxy exit.
struct PendingJump {
    target: CfgNodeId,
    /// Finally-stack depth of the jump's real target.
    target_depth: usize,
}

struct FinallyContext {
    proxy_enter: CfgNodeId,
    proxy_exit: CfgNodeId,
    pending: Vec<PendingJump>,
}

/// Catch targets for the speculative exceptional edges out of a try main
/// block.
struct TryContext {
    catch_enters: Vec<CfgNodeId>,
    in_main_block: bool,
}

/// Builds one [`ControlFlowGraph`] per call to [`CfgBuilder::build`].
///
/// Not reentrant; construction is single-threaded and synchronous per body.
pub struct CfgBuilder<'a> {
    arena: &'a AstArena,
    graph: ControlFlowGraph,
    /// Lexical nesting depth; incremented on scope entry, restored on exit.
    level: u32,
    /// Tail of the chain under construction.
    last: CfgNodeId,
    /// Set after a jump or non-returning call: the next sequential edge is
    /// recorded Dead because its source cannot complete normally.
    path_terminated: bool,
    /// Label for the next sequential edge, set by branching constructs.
    pending_branch: Option<BranchLabel>,
    loop_stack: Vec<LoopContext>,
    finally_stack: Vec<FinallyContext>,
    try_stack: Vec<TryContext>,
    function_exit: CfgNodeId,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(arena: &'a AstArena) -> Self {
        Self {
            arena,
            graph: ControlFlowGraph::new(),
            level: 0,
            last: CfgNodeId::NONE,
            path_terminated: false,
            pending_branch: None,
            loop_stack: Vec::new(),
            finally_stack: Vec::new(),
            try_stack: Vec::new(),
            function_exit: CfgNodeId::NONE,
        }
    }

    /// Build and seal the graph for one function body.
    ///
    /// `function` must be an [`Element::Function`]; anything else indicates
    /// an upstream resolution bug and fails with `MalformedControlFlow`.
    #[tracing::instrument(level = "trace", skip(self), fields(function = function.0))]
    pub fn build(mut self, function: ElementId) -> Result<ControlFlowGraph, CfgError> {
        let arena = self.arena;
        let body = match arena.get(function) {
            Some(Element::Function { body, .. }) => *body,
            Some(_) => {
                return Err(CfgError::malformed(
                    function,
                    "build root is not a function body",
                ));
            }
            None => return Err(CfgError::malformed(function, "dangling element reference")),
        };

        let enter = self.new_node(CfgNodeKind::FunctionEnter, Some(function));
        self.graph.set_enter(enter);
        let exit = self.new_node(CfgNodeKind::FunctionExit, Some(function));
        self.graph.set_exit(exit);
        self.function_exit = exit;
        self.last = enter;

        self.level += 1;
        self.visit(body)?;
        self.level -= 1;
        self.attach(exit);

        if !self.loop_stack.is_empty() || !self.finally_stack.is_empty() || !self.try_stack.is_empty()
        {
            return Err(CfgError::malformed(
                function,
                "context stacks not drained after traversal",
            ));
        }

        self.graph.finalize();
        trace!(
            nodes = self.graph.len(),
            unreachable = self.graph.unreachable_nodes().len(),
            "graph sealed"
        );
        Ok(self.graph)
    }

    // =========================================================================
    // Node factory and chaining
    // =========================================================================

    /// Create a node at the current level. Nodes created inside a try main
    /// block receive a speculative Exceptional edge to every enclosing catch
    /// clause enter, since any step of the block may throw.
    fn new_node(&mut self, kind: CfgNodeKind, element: Option<ElementId>) -> CfgNodeId {
        let id = self.graph.create_node(kind, element, self.level);
        for ctx in &self.try_stack {
            if ctx.in_main_block {
                for &catch_enter in &ctx.catch_enters {
                    self.graph.connect(id, catch_enter, EdgeKind::Exceptional);
                }
            }
        }
        id
    }

    /// Connect the chain tail to `node` and advance the tail. The edge is
    /// Dead when the tail cannot complete normally, labeled when a branching
    /// construct set a pending label, and Normal otherwise.
    fn attach(&mut self, node: CfgNodeId) {
        let pending = self.pending_branch.take();
        let kind = if std::mem::take(&mut self.path_terminated) {
            EdgeKind::Dead
        } else if let Some(label) = pending {
            EdgeKind::Branch(label)
        } else {
            EdgeKind::Normal
        };
        self.graph.connect(self.last, node, kind);
        self.last = node;
    }

    fn attach_new(&mut self, kind: CfgNodeKind, element: Option<ElementId>) -> CfgNodeId {
        let node = self.new_node(kind, element);
        self.attach(node);
        node
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn visit(&mut self, id: ElementId) -> Result<(), CfgError> {
        let arena = self.arena;
        let element = arena
            .get(id)
            .ok_or_else(|| CfgError::malformed(id, "dangling element reference"))?;
        match element {
            Element::Const { .. } => {
                self.attach_new(CfgNodeKind::ConstExpression, Some(id));
                Ok(())
            }
            Element::QualifiedAccess { .. } => {
                self.attach_new(CfgNodeKind::QualifiedAccess, Some(id));
                Ok(())
            }
            Element::NullTest { .. } => {
                self.attach_new(CfgNodeKind::NullTest, Some(id));
                Ok(())
            }
            Element::TypeTest { .. } => {
                self.attach_new(CfgNodeKind::TypeTest, Some(id));
                Ok(())
            }
            Element::Call {
                receiver,
                args,
                returns_never,
                ..
            } => self.build_call(id, *receiver, args, *returns_never),
            Element::VarDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    self.visit(*init)?;
                }
                self.attach_new(CfgNodeKind::VariableDeclaration, Some(id));
                Ok(())
            }
            Element::Assignment { value, .. } => {
                self.visit(*value)?;
                self.attach_new(CfgNodeKind::VariableAssignment, Some(id));
                Ok(())
            }
            Element::BinaryLogic {
                op, left, right, ..
            } => self.build_binary_logic(id, *op, *left, *right),
            Element::Block { statements, .. } => self.build_block(id, statements),
            Element::When {
                branches,
                is_exhaustive,
                ..
            } => self.build_when(id, branches, *is_exhaustive),
            Element::Loop {
                kind,
                condition,
                body,
                label,
                ..
            } => self.build_loop(id, *kind, *condition, *body, *label),
            Element::Try {
                main,
                catches,
                finally,
                ..
            } => self.build_try(id, *main, catches, *finally),
            Element::Jump {
                kind, value, label, ..
            } => self.build_jump(id, *kind, *value, *label),
            Element::Function { .. } => Err(CfgError::malformed(
                id,
                "nested function bodies are built as separate graphs",
            )),
        }
    }

    // =========================================================================
    // Construct-specific wiring
    // =========================================================================

    fn build_call(
        &mut self,
        id: ElementId,
        receiver: Option<ElementId>,
        args: &[ElementId],
        returns_never: bool,
    ) -> Result<(), CfgError> {
        // Receiver before arguments fixes evaluation order for consumers.
        if let Some(receiver) = receiver {
            self.visit(receiver)?;
        }
        for &arg in args {
            self.visit(arg)?;
        }
        let call = self.attach_new(CfgNodeKind::FunctionCall, Some(id));
        if returns_never {
            // The callee cannot return; the path ends here like a throw.
            self.route_jump(call, self.function_exit, 0);
            self.path_terminated = true;
        }
        Ok(())
    }

    fn build_block(&mut self, id: ElementId, statements: &[ElementId]) -> Result<(), CfgError> {
        self.attach_new(CfgNodeKind::BlockEnter, Some(id));
        self.level += 1;
        for &stmt in statements {
            self.visit(stmt)?;
        }
        self.level -= 1;
        self.attach_new(CfgNodeKind::BlockExit, Some(id));
        Ok(())
    }

    /// One `WhenEnter`, a condition enter/exit pair per guarded branch, a
    /// result enter/exit pair per branch body, and a single `WhenExit` join
    /// where consumers merge facts from every branch by intersection.
    fn build_when(
        &mut self,
        id: ElementId,
        branches: &[WhenBranch],
        is_exhaustive: bool,
    ) -> Result<(), CfgError> {
        let when_enter = self.attach_new(CfgNodeKind::WhenEnter, Some(id));
        let when_exit = self.new_node(CfgNodeKind::WhenExit, Some(id));

        // Where the fall-through edge of the next condition starts, and its
        // label. The first condition is entered Normal from WhenEnter; each
        // later one on the previous condition's false branch.
        let mut fall_source = when_enter;
        let mut fall_label: Option<BranchLabel> = None;
        let mut has_else = false;

        for branch in branches {
            self.last = fall_source;
            self.pending_branch = fall_label;
            match branch.condition {
                Some(condition) => {
                    self.attach_new(CfgNodeKind::WhenBranchConditionEnter, Some(condition));
                    self.visit(condition)?;
                    let cond_exit =
                        self.attach_new(CfgNodeKind::WhenBranchConditionExit, Some(condition));
                    self.pending_branch = Some(BranchLabel::Bool(true));
                    self.attach_new(CfgNodeKind::WhenBranchResultEnter, Some(branch.body));
                    self.visit(branch.body)?;
                    let result_exit =
                        self.attach_new(CfgNodeKind::WhenBranchResultExit, Some(branch.body));
                    self.graph.connect(result_exit, when_exit, EdgeKind::Normal);
                    fall_source = cond_exit;
                    fall_label = Some(BranchLabel::Bool(false));
                }
                None => {
                    has_else = true;
                    self.attach_new(CfgNodeKind::WhenBranchResultEnter, Some(branch.body));
                    self.visit(branch.body)?;
                    let result_exit =
                        self.attach_new(CfgNodeKind::WhenBranchResultExit, Some(branch.body));
                    self.graph.connect(result_exit, when_exit, EdgeKind::Normal);
                    // An else branch is last; nothing falls past it.
                    break;
                }
            }
        }

        if branches.is_empty() {
            self.graph.connect(when_enter, when_exit, EdgeKind::Normal);
        } else if !has_else {
            if is_exhaustive {
                // Resolution proved the conditions cover every case; the
                // all-false path cannot happen. Route it to a stub so the
                // join never sees it.
                self.last = fall_source;
                self.pending_branch = fall_label;
                let stub = self.attach_new(CfgNodeKind::Stub, None);
                self.graph.connect(stub, when_exit, EdgeKind::Dead);
            } else {
                // Possibly non-exhaustive: the construct may complete with
                // no branch taken.
                let kind = match fall_label {
                    Some(label) => EdgeKind::Branch(label),
                    None => EdgeKind::Normal,
                };
                self.graph.connect(fall_source, when_exit, kind);
            }
        }

        self.pending_branch = None;
        self.last = when_exit;
        Ok(())
    }

    fn build_binary_logic(
        &mut self,
        id: ElementId,
        op: LogicOp,
        left: ElementId,
        right: ElementId,
    ) -> Result<(), CfgError> {
        let (enter_kind, exit_left_kind, exit_kind, short_circuit) = match op {
            LogicOp::And => (
                CfgNodeKind::BinaryAndEnter,
                CfgNodeKind::BinaryAndExitLeftOperand,
                CfgNodeKind::BinaryAndExit,
                false,
            ),
            LogicOp::Or => (
                CfgNodeKind::BinaryOrEnter,
                CfgNodeKind::BinaryOrExitLeftOperand,
                CfgNodeKind::BinaryOrExit,
                true,
            ),
        };
        self.attach_new(enter_kind, Some(id));
        self.visit(left)?;
        let exit_left = self.attach_new(exit_left_kind, Some(id));
        let exit = self.new_node(exit_kind, Some(id));
        // The short-circuit outcome skips the right operand entirely: no
        // node of the right side lies on this edge.
        self.graph
            .connect(exit_left, exit, EdgeKind::Branch(BranchLabel::Bool(short_circuit)));
        self.pending_branch = Some(BranchLabel::Bool(!short_circuit));
        self.visit(right)?;
        self.attach(exit);
        Ok(())
    }

    fn build_loop(
        &mut self,
        id: ElementId,
        kind: LoopKind,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
    ) -> Result<(), CfgError> {
        match kind {
            LoopKind::While => self.build_while(id, condition, body, label),
            LoopKind::DoWhile => self.build_do_while(id, condition, body, label),
        }
    }

    fn build_while(
        &mut self,
        id: ElementId,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
    ) -> Result<(), CfgError> {
        self.attach_new(CfgNodeKind::LoopEnter, Some(id));
        let cond_enter = self.attach_new(CfgNodeKind::LoopConditionEnter, Some(condition));
        self.visit(condition)?;
        let cond_exit = self.attach_new(CfgNodeKind::LoopConditionExit, Some(condition));
        let loop_exit = self.new_node(CfgNodeKind::LoopExit, Some(id));
        self.graph
            .connect(cond_exit, loop_exit, EdgeKind::Branch(BranchLabel::Bool(false)));
        self.pending_branch = Some(BranchLabel::Bool(true));
        self.attach_new(CfgNodeKind::LoopBlockEnter, Some(body));
        self.loop_stack.push(LoopContext {
            label,
            continue_target: cond_enter,
            break_target: loop_exit,
            finally_depth: self.finally_stack.len(),
        });
        self.visit(body)?;
        self.loop_stack.pop();
        self.attach_new(CfgNodeKind::LoopBlockExit, Some(body));
        // The back-edge: re-check the condition after the body.
        self.attach(cond_enter);
        self.last = loop_exit;
        Ok(())
    }

    /// Differs from `while` only in that the body is reached directly from
    /// `LoopEnter` before the first condition check.
    fn build_do_while(
        &mut self,
        id: ElementId,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
    ) -> Result<(), CfgError> {
        self.attach_new(CfgNodeKind::LoopEnter, Some(id));
        let cond_enter = self.new_node(CfgNodeKind::LoopConditionEnter, Some(condition));
        let loop_exit = self.new_node(CfgNodeKind::LoopExit, Some(id));
        let block_enter = self.attach_new(CfgNodeKind::LoopBlockEnter, Some(body));
        self.loop_stack.push(LoopContext {
            label,
            continue_target: cond_enter,
            break_target: loop_exit,
            finally_depth: self.finally_stack.len(),
        });
        self.visit(body)?;
        self.loop_stack.pop();
        self.attach_new(CfgNodeKind::LoopBlockExit, Some(body));
        self.attach(cond_enter);
        self.visit(condition)?;
        let cond_exit = self.attach_new(CfgNodeKind::LoopConditionExit, Some(condition));
        self.graph
            .connect(cond_exit, block_enter, EdgeKind::Branch(BranchLabel::Bool(true)));
        self.graph
            .connect(cond_exit, loop_exit, EdgeKind::Branch(BranchLabel::Bool(false)));
        self.last = loop_exit;
        Ok(())
    }

    /// Try wiring: every node of the main block gets a speculative
    /// Exceptional edge to every catch enter (the analysis does not model
    /// which sub-expression can throw which type). Main-block and catch
    /// exits converge on the finally proxy when a finally exists, otherwise
    /// directly on `TryExit`. Non-local jumps out of the protected region
    /// are re-routed through every enclosing finally before reaching their
    /// real target, so finally side effects run exactly once per exit path.
    fn build_try(
        &mut self,
        id: ElementId,
        main: ElementId,
        catches: &[CatchClause],
        finally: Option<ElementId>,
    ) -> Result<(), CfgError> {
        let try_enter = self.attach_new(CfgNodeKind::TryEnter, Some(id));
        let try_exit = self.new_node(CfgNodeKind::TryExit, Some(id));

        // Catch enters exist before the main block so the speculative edges
        // have targets from the first main-block node on.
        let catch_enters: Vec<CfgNodeId> = catches
            .iter()
            .map(|clause| self.new_node(CfgNodeKind::CatchClauseEnter, Some(clause.body)))
            .collect();

        let finally_proxies = if let Some(finally_block) = finally {
            let proxy_enter = self.new_node(CfgNodeKind::FinallyProxyEnter, None);
            let proxy_exit = self.new_node(CfgNodeKind::FinallyProxyExit, None);
            self.finally_stack.push(FinallyContext {
                proxy_enter,
                proxy_exit,
                pending: Vec::new(),
            });
            Some((proxy_enter, proxy_exit, finally_block))
        } else {
            None
        };
        let converge = match finally_proxies {
            Some((proxy_enter, _, _)) => proxy_enter,
            None => try_exit,
        };

        self.try_stack.push(TryContext {
            catch_enters: catch_enters.clone(),
            in_main_block: true,
        });
        self.last = try_enter;
        self.attach_new(CfgNodeKind::TryMainBlockEnter, Some(main));
        self.visit(main)?;
        let main_exit = self.attach_new(CfgNodeKind::TryMainBlockExit, Some(main));
        self.graph.connect(main_exit, converge, EdgeKind::Normal);
        if let Some(ctx) = self.try_stack.last_mut() {
            ctx.in_main_block = false;
        }

        for (clause, &catch_enter) in catches.iter().zip(&catch_enters) {
            self.last = catch_enter;
            self.visit(clause.body)?;
            let catch_exit = self.attach_new(CfgNodeKind::CatchClauseExit, Some(clause.body));
            self.graph.connect(catch_exit, converge, EdgeKind::Normal);
        }
        self.try_stack.pop();

        if let Some((proxy_enter, proxy_exit, finally_block)) = finally_proxies {
            // Pop before building the finally body: jumps inside the finally
            // itself route to outer contexts, not back into this one.
            let pending = match self.finally_stack.pop() {
                Some(ctx) => ctx.pending,
                None => Vec::new(),
            };
            self.last = proxy_enter;
            self.attach_new(CfgNodeKind::FinallyBlockEnter, Some(finally_block));
            self.visit(finally_block)?;
            let finally_exit = self.attach_new(CfgNodeKind::FinallyBlockExit, Some(finally_block));
            self.graph.connect(finally_exit, proxy_exit, EdgeKind::Normal);

            // Re-dispatch: the normal continuation plus every captured jump,
            // each hop going through the next enclosing finally if the
            // target lies outside it too.
            self.graph.connect(proxy_exit, try_exit, EdgeKind::Normal);
            let mut connected: FxHashSet<CfgNodeId> = FxHashSet::default();
            connected.insert(try_exit);
            for jump in pending {
                if self.finally_stack.len() > jump.target_depth {
                    if let Some(outer) = self.finally_stack.last_mut() {
                        let hop = outer.proxy_enter;
                        outer.pending.push(jump);
                        if connected.insert(hop) {
                            self.graph.connect(proxy_exit, hop, EdgeKind::Normal);
                        }
                    }
                } else if connected.insert(jump.target) {
                    self.graph.connect(proxy_exit, jump.target, EdgeKind::Normal);
                }
            }
        }

        self.last = try_exit;
        Ok(())
    }

    fn build_jump(
        &mut self,
        id: ElementId,
        kind: JumpKind,
        value: Option<ElementId>,
        label: Option<LabelId>,
    ) -> Result<(), CfgError> {
        if let Some(value) = value {
            self.visit(value)?;
        }
        let jump = self.attach_new(CfgNodeKind::Jump, Some(id));
        let (target, target_depth) = match kind {
            JumpKind::Return | JumpKind::Throw => (self.function_exit, 0),
            JumpKind::Break => self.resolve_loop_target(id, label, true)?,
            JumpKind::Continue => self.resolve_loop_target(id, label, false)?,
        };
        self.route_jump(jump, target, target_depth);
        self.path_terminated = true;
        Ok(())
    }

    /// Find the loop a `break`/`continue` refers to. A missing target means
    /// upstream resolution produced a jump we cannot place; that is fatal
    /// for this body.
    fn resolve_loop_target(
        &self,
        element: ElementId,
        label: Option<LabelId>,
        is_break: bool,
    ) -> Result<(CfgNodeId, usize), CfgError> {
        for ctx in self.loop_stack.iter().rev() {
            if label.is_none() || ctx.label == label {
                let target = if is_break {
                    ctx.break_target
                } else {
                    ctx.continue_target
                };
                return Ok((target, ctx.finally_depth));
            }
        }
        Err(CfgError::malformed(
            element,
            if is_break {
                "break target not found on loop context stack"
            } else {
                "continue target not found on loop context stack"
            },
        ))
    }

    /// Connect a path-terminating node to its destination, detouring through
    /// the nearest enclosing finally when the destination lies outside it.
    fn route_jump(&mut self, from: CfgNodeId, target: CfgNodeId, target_depth: usize) {
        if self.finally_stack.len() > target_depth {
            if let Some(ctx) = self.finally_stack.last_mut() {
                let proxy_enter = ctx.proxy_enter;
                ctx.pending.push(PendingJump {
                    target,
                    target_depth,
                });
                self.graph.connect(from, proxy_enter, EdgeKind::Normal);
                return;
            }
        }
        self.graph.connect(from, target, EdgeKind::Normal);
    }
}
