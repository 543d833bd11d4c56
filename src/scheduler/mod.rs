//! Shift staffing runs and KPI evaluation.
//!
//! # Algorithm
//!
//! `ShiftMatcher` ranks historical workers for every open shift by
//! similarity, wires the rankings into a SOURCE → shift → worker → SINK
//! network bounded by shift and weekly hours, and solves one global max
//! flow. Each shift's flow-carrying edge names its worker.
//!
//! # KPI
//!
//! `StaffingKpi` computes fill rate, hour coverage and per-worker load.
//!
//! # References
//!
//! - Edmonds & Karp (1972), "Theoretical Improvements in Algorithmic
//!   Efficiency for Network Flow Problems"
//! - Ahuja, Magnanti & Orlin (1993), "Network Flows", Ch. 6-7

mod kpi;
mod matcher;

pub use kpi::StaffingKpi;
pub use matcher::{AssignmentPlan, ShiftCandidates, ShiftMatcher};
