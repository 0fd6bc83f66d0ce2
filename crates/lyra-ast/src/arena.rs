//! Push-only element arena for one compilation unit.

use crate::element::{
    CatchClause, Element, InvocationKind, JumpKind, LogicOp, LoopKind, Param, WhenBranch,
};
use crate::ids::{ElementId, LabelId, SymbolId, TypeId};
use lyra_common::ByteSpan;

/// Owns every [`Element`] of a compilation unit.
///
/// Elements are referenced by [`ElementId`] and are never removed or mutated
/// after allocation; the builder treats the arena as immutable for the
/// duration of one graph construction.
#[derive(Debug, Default)]
pub struct AstArena {
    elements: Vec<Element>,
}

impl AstArena {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn alloc(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // =========================================================================
    // Convenience constructors
    // =========================================================================
    // The resolution collaborator produces elements through these; tests use
    // them to assemble bodies by hand.

    pub fn const_expr(&mut self, span: ByteSpan) -> ElementId {
        self.alloc(Element::Const {
            ty: TypeId::UNKNOWN,
            span,
        })
    }

    pub fn access(&mut self, symbol: SymbolId, span: ByteSpan) -> ElementId {
        self.alloc(Element::QualifiedAccess {
            symbol,
            ty: TypeId::UNKNOWN,
            span,
        })
    }

    pub fn call(
        &mut self,
        callee: Option<SymbolId>,
        args: Vec<ElementId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::Call {
            callee,
            receiver: None,
            args,
            ty: TypeId::UNKNOWN,
            returns_never: false,
            span,
        })
    }

    /// A call to a callee that never returns normally (e.g. `error(..)`).
    pub fn call_never(
        &mut self,
        callee: Option<SymbolId>,
        args: Vec<ElementId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::Call {
            callee,
            receiver: None,
            args,
            ty: TypeId::UNKNOWN,
            returns_never: true,
            span,
        })
    }

    pub fn var_decl(
        &mut self,
        symbol: SymbolId,
        initializer: Option<ElementId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::VarDecl {
            symbol,
            initializer,
            span,
        })
    }

    pub fn assign(&mut self, target: SymbolId, value: ElementId, span: ByteSpan) -> ElementId {
        self.alloc(Element::Assignment {
            target,
            value,
            span,
        })
    }

    pub fn null_test(
        &mut self,
        operand: SymbolId,
        expects_non_null: bool,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::NullTest {
            operand,
            expects_non_null,
            span,
        })
    }

    pub fn type_test(&mut self, operand: SymbolId, ty: TypeId, span: ByteSpan) -> ElementId {
        self.alloc(Element::TypeTest {
            operand,
            ty,
            negated: false,
            span,
        })
    }

    pub fn and(&mut self, left: ElementId, right: ElementId, span: ByteSpan) -> ElementId {
        self.alloc(Element::BinaryLogic {
            op: LogicOp::And,
            left,
            right,
            span,
        })
    }

    pub fn or(&mut self, left: ElementId, right: ElementId, span: ByteSpan) -> ElementId {
        self.alloc(Element::BinaryLogic {
            op: LogicOp::Or,
            left,
            right,
            span,
        })
    }

    pub fn block(&mut self, statements: Vec<ElementId>, span: ByteSpan) -> ElementId {
        self.alloc(Element::Block { statements, span })
    }

    pub fn when(
        &mut self,
        branches: Vec<WhenBranch>,
        is_exhaustive: bool,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::When {
            branches,
            is_exhaustive,
            span,
        })
    }

    /// A two-branch `when` modeling `if (condition) then_body else else_body`.
    pub fn if_else(
        &mut self,
        condition: ElementId,
        then_body: ElementId,
        else_body: Option<ElementId>,
        span: ByteSpan,
    ) -> ElementId {
        let mut branches = vec![WhenBranch {
            condition: Some(condition),
            body: then_body,
        }];
        if let Some(body) = else_body {
            branches.push(WhenBranch {
                condition: None,
                body,
            });
        }
        self.when(branches, false, span)
    }

    pub fn while_loop(
        &mut self,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::Loop {
            kind: LoopKind::While,
            condition,
            body,
            label,
            span,
        })
    }

    pub fn do_while(
        &mut self,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::Loop {
            kind: LoopKind::DoWhile,
            condition,
            body,
            label,
            span,
        })
    }

    pub fn try_stmt(
        &mut self,
        main: ElementId,
        catches: Vec<CatchClause>,
        finally: Option<ElementId>,
        span: ByteSpan,
    ) -> ElementId {
        self.alloc(Element::Try {
            main,
            catches,
            finally,
            span,
        })
    }

    pub fn ret(&mut self, value: Option<ElementId>, span: ByteSpan) -> ElementId {
        self.alloc(Element::Jump {
            kind: JumpKind::Return,
            value,
            label: None,
            span,
        })
    }

    pub fn brk(&mut self, label: Option<LabelId>, span: ByteSpan) -> ElementId {
        self.alloc(Element::Jump {
            kind: JumpKind::Break,
            value: None,
            label,
            span,
        })
    }

    pub fn cont(&mut self, label: Option<LabelId>, span: ByteSpan) -> ElementId {
        self.alloc(Element::Jump {
            kind: JumpKind::Continue,
            value: None,
            label,
            span,
        })
    }

    pub fn throw(&mut self, value: Option<ElementId>, span: ByteSpan) -> ElementId {
        self.alloc(Element::Jump {
            kind: JumpKind::Throw,
            value,
            label: None,
            span,
        })
    }

    pub fn function(&mut self, params: Vec<Param>, body: ElementId, span: ByteSpan) -> ElementId {
        self.alloc(Element::Function { params, body, span })
    }

    /// A parameter without a contract.
    pub fn param(symbol: SymbolId) -> Param {
        Param {
            symbol,
            ty: TypeId::UNKNOWN,
            contract: None,
        }
    }

    /// A function-typed parameter carrying a calls-in-place contract.
    pub fn contract_param(symbol: SymbolId, contract: InvocationKind) -> Param {
        Param {
            symbol,
            ty: TypeId::UNKNOWN,
            contract: Some(contract),
        }
    }
}
