//! Control flow graph construction for the Lyra compiler.
//!
//! This crate turns one resolved, typed function body (`lyra-ast`) into a
//! [`ControlFlowGraph`]: a directed graph whose nodes are evaluation steps
//! and whose edges are possible execution transitions.
//!
//! The crate is organized into:
//! - `graph` - the node/edge data structures and the owning graph container
//! - `builder` - the recursive, structure-driven traversal that allocates
//!   nodes and wires edges for every control construct
//! - `error` - the internal-error taxonomy surfaced to the host
//!
//! A finished graph is sealed by [`ControlFlowGraph::finalize`] and is safe
//! for unsynchronized concurrent reads; flow analyses (`lyra-flow`) consume
//! it without ever mutating it.

pub mod builder;
pub mod error;
pub mod graph;

pub use builder::CfgBuilder;
pub use error::CfgError;
pub use graph::{BranchLabel, CfgNode, CfgNodeId, CfgNodeKind, ControlFlowGraph, Edge, EdgeKind};
