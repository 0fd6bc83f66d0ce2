//! Fixed-point data-flow analyses over sealed Lyra control flow graphs.
//!
//! `driver` provides the generic worklist engine and the [`FlowAnalysis`]
//! trait that consumers implement; the remaining modules are the concrete
//! analyses shipped with the compiler:
//!
//! - `nullness` - per-symbol non-null narrowing fed by condition branches
//! - `assignment` - definite-assignment checking (use before assignment)
//! - `contracts` - calls-in-place invocation-count contract verification
//! - `reachability` - unreachable-code warnings from the sealed graph
//!
//! Analyses never mutate the graph. Each owns only its fact lattice; the
//! driver owns iteration order, convergence bounds, and fact storage.

pub mod assignment;
pub mod contracts;
pub mod driver;
pub mod nullness;
pub mod reachability;

pub use assignment::{AssignmentAnalysis, AssignmentFacts, AssignmentState};
pub use contracts::{CallRange, ContractAnalysis, ContractFacts};
pub use driver::{AnalysisError, FlowAnalysis, PerNodeFacts, run};
pub use nullness::{NullnessAnalysis, NullnessFacts};
pub use reachability::ReachabilityReporter;
