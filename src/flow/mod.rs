//! Capacitated flow network and max-flow assignment solver.
//!
//! Open shifts and candidate workers form a layered network
//! (SOURCE → shift → worker → SINK). Shift intake and shift → worker edges
//! carry the per-shift hours, worker → SINK edges the weekly hours. A
//! maximum flow is a globally consistent assignment that respects both
//! limits; positive-flow shift → worker edges are read out as assignments.

mod network;
mod readout;
mod solver;

pub use network::{EdgeView, FlowNetwork, NodeId};
pub use readout::{read_assignments, shift_allocations};
pub use solver::{AugmentingPath, FlowSummary, MaxFlowSolver, SolverState, FLOW_EPSILON};
