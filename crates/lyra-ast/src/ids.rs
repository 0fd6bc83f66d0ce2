//! Stable integer handles into upstream compiler state.
//!
//! Symbols, types and labels are owned by the resolution collaborator; this
//! core only ever compares and hashes the handles.

/// Index of an element in an [`crate::AstArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved symbol (local variable, parameter, callee).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// A resolved static type. Opaque to this core; only identity matters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Placeholder for expressions whose type is irrelevant to flow analysis.
    pub const UNKNOWN: TypeId = TypeId(0);
}

/// A resolved jump label on a loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);
