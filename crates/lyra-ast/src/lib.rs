//! Resolved, typed syntax tree for the Lyra compiler.
//!
//! This crate defines the input model consumed by the control-flow graph
//! builder: one fully resolved function/lambda/initializer body at a time.
//! Name resolution and type inference happen upstream; every expression here
//! already carries its resolved symbol (`SymbolId`) and static type
//! (`TypeId`), and control constructs carry their parsed sub-structure.
//!
//! Elements live in a push-only [`AstArena`] and reference each other by
//! [`ElementId`], never by pointer, so a whole body can be moved or dropped
//! as a unit.

pub mod arena;
pub mod element;
pub mod ids;

pub use arena::AstArena;
pub use element::{
    CatchClause, Element, InvocationKind, JumpKind, LogicOp, LoopKind, Param, WhenBranch,
};
pub use ids::{ElementId, LabelId, SymbolId, TypeId};
