//! The closed element taxonomy for one function-like body.

use crate::ids::{ElementId, LabelId, SymbolId, TypeId};
use lyra_common::ByteSpan;

/// Short-circuit boolean operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// Loop flavor. `DoWhile` runs the body once before the first condition check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopKind {
    While,
    DoWhile,
}

/// Non-local jumps. All of them terminate the current path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Return,
    Break,
    Continue,
    Throw,
}

/// Caller-visible invocation-count contract on a function-typed parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvocationKind {
    AtMostOnce,
    ExactlyOnce,
    AtLeastOnce,
}

/// A function parameter with its resolved symbol and declared contract.
#[derive(Clone, Debug)]
pub struct Param {
    pub symbol: SymbolId,
    pub ty: TypeId,
    pub contract: Option<InvocationKind>,
}

/// One branch of a `when`. A branch without a condition is the else branch.
#[derive(Clone, Debug)]
pub struct WhenBranch {
    pub condition: Option<ElementId>,
    pub body: ElementId,
}

/// One catch clause of a `try`.
#[derive(Clone, Debug)]
pub struct CatchClause {
    pub parameter: Option<SymbolId>,
    pub body: ElementId,
}

/// A resolved, typed syntax-tree element.
///
/// This is a closed taxonomy: the builder dispatches on the variant, and
/// every control-flow-affecting construct carries its already-parsed
/// sub-structure.
#[derive(Clone, Debug)]
pub enum Element {
    /// A constant expression. No control-flow effect.
    Const { ty: TypeId, span: ByteSpan },
    /// A read of a resolved symbol (plain variable or property access).
    QualifiedAccess {
        symbol: SymbolId,
        ty: TypeId,
        span: ByteSpan,
    },
    /// A resolved call. `returns_never` marks callees that cannot return
    /// normally; the path terminates at the call like a `throw`.
    Call {
        callee: Option<SymbolId>,
        receiver: Option<ElementId>,
        args: Vec<ElementId>,
        ty: TypeId,
        returns_never: bool,
        span: ByteSpan,
    },
    /// A local variable declaration, optionally initialized.
    VarDecl {
        symbol: SymbolId,
        initializer: Option<ElementId>,
        span: ByteSpan,
    },
    /// An assignment to a resolved symbol.
    Assignment {
        target: SymbolId,
        value: ElementId,
        span: ByteSpan,
    },
    /// A null comparison on a symbol. `expects_non_null` is true for
    /// `x != null` and false for `x == null`.
    NullTest {
        operand: SymbolId,
        expects_non_null: bool,
        span: ByteSpan,
    },
    /// A runtime type test (`x is T`, negated for `x !is T`).
    TypeTest {
        operand: SymbolId,
        ty: TypeId,
        negated: bool,
        span: ByteSpan,
    },
    /// Short-circuit `&&` / `||`.
    BinaryLogic {
        op: LogicOp,
        left: ElementId,
        right: ElementId,
        span: ByteSpan,
    },
    /// A statement block. Opens a lexical scope.
    Block {
        statements: Vec<ElementId>,
        span: ByteSpan,
    },
    /// A multi-branch conditional (`if` is a two-branch `when`).
    ///
    /// `is_exhaustive` is decided upstream (e.g. a sealed-type match); for an
    /// exhaustive `when` the fall-through-all-conditions path cannot happen.
    When {
        branches: Vec<WhenBranch>,
        is_exhaustive: bool,
        span: ByteSpan,
    },
    /// A `while` or `do-while` loop, optionally labeled.
    Loop {
        kind: LoopKind,
        condition: ElementId,
        body: ElementId,
        label: Option<LabelId>,
        span: ByteSpan,
    },
    /// `try { main } catch* { .. } finally? { .. }`.
    Try {
        main: ElementId,
        catches: Vec<CatchClause>,
        finally: Option<ElementId>,
        span: ByteSpan,
    },
    /// `return` / `break` / `continue` / `throw`.
    Jump {
        kind: JumpKind,
        value: Option<ElementId>,
        label: Option<LabelId>,
        span: ByteSpan,
    },
    /// A function-like body: the root of one graph construction.
    Function {
        params: Vec<Param>,
        body: ElementId,
        span: ByteSpan,
    },
}

impl Element {
    pub fn span(&self) -> ByteSpan {
        match self {
            Element::Const { span, .. }
            | Element::QualifiedAccess { span, .. }
            | Element::Call { span, .. }
            | Element::VarDecl { span, .. }
            | Element::Assignment { span, .. }
            | Element::NullTest { span, .. }
            | Element::TypeTest { span, .. }
            | Element::BinaryLogic { span, .. }
            | Element::Block { span, .. }
            | Element::When { span, .. }
            | Element::Loop { span, .. }
            | Element::Try { span, .. }
            | Element::Jump { span, .. }
            | Element::Function { span, .. } => *span,
        }
    }
}
