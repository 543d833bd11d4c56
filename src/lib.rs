//! Shift staffing for the U-Engine ecosystem.
//!
//! Assigns workers to open shifts by ranking historical worker/shift records
//! against each shift, then resolving the rankings into an hour-bounded
//! assignment with a single maximum flow.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `WorkType`, `HistoryTable`, `Query`,
//!   `OpenShift`, `Assignment`
//! - **`similarity`**: Reduced-basis projection and cosine ranking
//!   (`SimilarityScorer`, `CandidateScore`)
//! - **`flow`**: Capacitated network and Edmonds–Karp solver
//!   (`FlowNetwork`, `MaxFlowSolver`, `read_assignments`)
//! - **`scheduler`**: End-to-end runs and KPIs (`ShiftMatcher`, `StaffingKpi`)
//! - **`input`**: String-row adapters with parse recovery (`TableReader`)
//! - **`validation`**: Pre-run checks (work types, history size, capacities)
//! - **`config`** / **`error`**: `StaffingConfig`, `StaffingError`
//!
//! # Example
//!
//! ```
//! use u_staffing::{StaffingConfig, ShiftMatcher, StaffingKpi, TableReader, WorkTypeVocabulary};
//!
//! let vocab = WorkTypeVocabulary::default();
//! let config = StaffingConfig::default();
//! let reader = TableReader::new(&vocab, &config);
//!
//! let history = reader.read_history([
//!     ["1", "1", "CNA", "True", "ana"],
//!     ["1", "2", "LPN", "True", "ben"],
//!     ["2", "1", "CNA", "True", "ana"],
//!     ["2", "3", "ZZZ", "False", "cai"],
//! ])?;
//! let open = reader.read_open_shifts([["3", "1", "CNA"], ["3", "2", "LPN"]])?;
//!
//! let matcher = ShiftMatcher::new(config.clone(), vocab.clone());
//! let plan = matcher.run(&history, &open.shifts)?;
//! for line in plan.lines() {
//!     println!("{line}");
//! }
//! let kpi = StaffingKpi::calculate(&plan, &config);
//! assert!(kpi.fill_rate <= 1.0);
//! # Ok::<(), u_staffing::StaffingError>(())
//! ```
//!
//! # Logging
//!
//! Emits `tracing` events (warn for skipped edges, recovered fields and
//! zero-variance history; info for the run summary). Install a subscriber
//! to see them.
//!
//! # References
//!
//! - Edmonds & Karp (1972), "Theoretical Improvements in Algorithmic
//!   Efficiency for Network Flow Problems"
//! - Deerwester et al. (1990), "Indexing by Latent Semantic Analysis"

pub mod config;
pub mod error;
pub mod flow;
pub mod input;
pub mod models;
pub mod scheduler;
pub mod similarity;
pub mod validation;

pub use config::{ParseRecovery, PathSearch, RetentionMode, StaffingConfig};
pub use error::{ErrorKind, Result, StaffingError};
pub use input::TableReader;
pub use models::{Assignment, HistoryTable, OpenShift, WorkType, WorkTypeVocabulary};
pub use scheduler::{AssignmentPlan, ShiftMatcher, StaffingKpi};
