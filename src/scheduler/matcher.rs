//! Shift matcher: drives the similarity scorer and the max-flow solver.
//!
//! # Algorithm
//!
//! 1. Validate configuration, history and open shifts. Nothing is built
//!    until validation passes.
//! 2. Fit the similarity scorer once on the history table.
//! 3. Rank candidates for every open shift. Queries are independent and
//!    read-only; all ranking finishes before the network is touched.
//! 4. Assemble the network serially: per shift, a shift node and
//!    SOURCE → shift intake (`shift_hours`, accumulating); per candidate,
//!    a worker node, shift → worker (`shift_hours`) and worker → SINK
//!    (`week_hours`). A failing edge is logged and skipped, as is a
//!    candidate whose record has no worker id.
//! 5. Solve one global max flow and read out one assignment per shift.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::StaffingConfig;
use crate::error::{Result, StaffingError};
use crate::flow::{read_assignments, FlowNetwork, FlowSummary, MaxFlowSolver, NodeId};
use crate::models::{Assignment, HistoryTable, OpenShift, WorkTypeVocabulary};
use crate::similarity::{CandidateScore, SimilarityScorer};
use crate::validation::validate_request;

/// Ranked candidates for one open shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCandidates {
    pub shift: OpenShift,
    pub candidates: Vec<CandidateScore>,
}

impl ShiftCandidates {
    /// Creates a candidate list.
    pub fn new(shift: OpenShift, candidates: Vec<CandidateScore>) -> Self {
        Self { shift, candidates }
    }
}

/// Result of a staffing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    /// One entry per open shift, in input order.
    pub assignments: Vec<Assignment>,
    /// Candidate lists the network was built from.
    pub candidates: Vec<ShiftCandidates>,
    /// Max-flow outcome.
    pub summary: FlowSummary,
}

impl AssignmentPlan {
    /// Number of filled shifts.
    pub fn filled_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_filled()).count()
    }

    /// Unfilled shifts.
    pub fn unfilled(&self) -> Vec<&Assignment> {
        self.assignments.iter().filter(|a| !a.is_filled()).collect()
    }

    /// Assignments for a worker.
    pub fn assignments_for_worker(&self, worker_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.worker_id.as_deref() == Some(worker_id))
            .collect()
    }

    /// Output lines: `"{shift_key} {worker|unfilled} {hours}"`.
    pub fn lines(&self) -> Vec<String> {
        self.assignments.iter().map(ToString::to_string).collect()
    }
}

/// Assigns workers to open shifts.
///
/// # Example
/// ```
/// use u_staffing::config::StaffingConfig;
/// use u_staffing::models::{HistoryTable, Observation, OpenShift, WorkType, WorkTypeVocabulary};
/// use u_staffing::scheduler::ShiftMatcher;
///
/// let history = HistoryTable::from_observations(
///     vec![
///         Observation::new(1, 1, WorkType(0), true, "ana"),
///         Observation::new(2, 2, WorkType(1), true, "ben"),
///         Observation::new(3, 1, WorkType(0), true, "cai"),
///     ],
///     0.01,
/// );
/// let shifts = vec![OpenShift::new(1, 1, WorkType(0)), OpenShift::new(2, 2, WorkType(1))];
///
/// let matcher = ShiftMatcher::new(StaffingConfig::default(), WorkTypeVocabulary::default());
/// let plan = matcher.run(&history, &shifts).unwrap();
/// assert_eq!(plan.assignments.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ShiftMatcher {
    config: StaffingConfig,
    vocabulary: WorkTypeVocabulary,
}

impl ShiftMatcher {
    /// Creates a matcher.
    pub fn new(config: StaffingConfig, vocabulary: WorkTypeVocabulary) -> Self {
        Self { config, vocabulary }
    }

    /// The run configuration.
    pub fn config(&self) -> &StaffingConfig {
        &self.config
    }

    /// The work-type vocabulary.
    pub fn vocabulary(&self) -> &WorkTypeVocabulary {
        &self.vocabulary
    }

    /// Validates a run's inputs.
    pub fn validate(&self, history: &HistoryTable, open_shifts: &[OpenShift]) -> Result<()> {
        validate_request(&self.config, &self.vocabulary, history, open_shifts)
            .map_err(StaffingError::Validation)
    }

    /// Candidates per shift: `candidate_limit`, or the number of open shifts.
    pub fn candidate_limit(&self, open_shifts: &[OpenShift]) -> usize {
        self.config.candidate_limit.unwrap_or(open_shifts.len())
    }

    /// Similarity-ranked candidates for every open shift, in input order.
    pub fn rank_candidates(
        &self,
        history: &HistoryTable,
        open_shifts: &[OpenShift],
    ) -> Result<Vec<ShiftCandidates>> {
        self.validate(history, open_shifts)?;

        let scorer = SimilarityScorer::fit(history, &self.vocabulary, &self.config)?;
        let limit = self.candidate_limit(open_shifts);

        open_shifts
            .iter()
            .map(|shift| {
                let candidates = scorer.rank(&shift.to_query(), limit)?;
                Ok(ShiftCandidates::new(*shift, candidates))
            })
            .collect()
    }

    /// Builds the layered network from ranked candidates.
    ///
    /// Edge-level failures and candidates with a blank worker id are logged
    /// and skipped; the network is returned with whatever could be added.
    pub fn assemble(&self, candidates: &[ShiftCandidates]) -> FlowNetwork {
        let mut network = FlowNetwork::new();
        let shift_hours = self.config.shift_hours;
        let week_hours = self.config.week_hours;

        for entry in candidates {
            let shift = NodeId::shift(entry.shift.shift_key());
            network.add_node(shift.clone());
            if let Err(e) = network.add_leading_edge(&shift, shift_hours) {
                warn!(%shift, error = %e, "skipping shift intake edge");
                continue;
            }

            for candidate in &entry.candidates {
                if candidate.worker_id.trim().is_empty() {
                    warn!(
                        %shift,
                        record = candidate.record_index,
                        "skipping candidate without worker id"
                    );
                    continue;
                }
                let worker = NodeId::worker(candidate.worker_id.as_str());
                network.add_node(worker.clone());
                if let Err(e) = network.add_edge(&shift, &worker, shift_hours, false) {
                    warn!(%shift, %worker, error = %e, "skipping candidate edge");
                    continue;
                }
                if let Err(e) = network.add_trailing_edge(&worker, week_hours) {
                    warn!(%worker, error = %e, "skipping weekly capacity edge");
                }
            }
        }

        network
    }

    /// Ranks candidates and assembles the network without solving it.
    pub fn build_network(
        &self,
        history: &HistoryTable,
        open_shifts: &[OpenShift],
    ) -> Result<(FlowNetwork, Vec<ShiftCandidates>)> {
        let candidates = self.rank_candidates(history, open_shifts)?;
        let network = self.assemble(&candidates);
        Ok((network, candidates))
    }

    /// Solves an assembled network and reads out the plan.
    pub fn solve(
        &self,
        network: &mut FlowNetwork,
        candidates: Vec<ShiftCandidates>,
    ) -> Result<AssignmentPlan> {
        let summary = MaxFlowSolver::from_config(&self.config).solve(network)?;
        let shifts: Vec<OpenShift> = candidates.iter().map(|c| c.shift).collect();
        let assignments = read_assignments(network, &shifts);

        Ok(AssignmentPlan {
            assignments,
            candidates,
            summary,
        })
    }

    /// Full run: validate, rank, assemble, solve, read out.
    #[instrument(skip_all, fields(shifts = open_shifts.len(), records = history.len()))]
    pub fn run(&self, history: &HistoryTable, open_shifts: &[OpenShift]) -> Result<AssignmentPlan> {
        let (mut network, candidates) = self.build_network(history, open_shifts)?;
        let plan = self.solve(&mut network, candidates)?;

        info!(
            filled = plan.filled_count(),
            unfilled = plan.assignments.len() - plan.filled_count(),
            total_hours = plan.summary.total_flow,
            augmentations = plan.summary.augmentations,
            "staffing run complete"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetentionMode;
    use crate::error::ErrorKind;
    use crate::flow::SolverState;
    use crate::models::{Observation, WorkType};

    fn sample_history() -> HistoryTable {
        let mut obs = Vec::new();
        for day in 1..=7 {
            obs.push(Observation::new(day, 1, WorkType(0), true, "ana"));
            obs.push(Observation::new(day, 2, WorkType(1), true, "ben"));
            obs.push(Observation::new(day, 3, WorkType(2), day % 2 == 0, "cai"));
        }
        obs.push(Observation::new(2, 1, WorkType(0), true, "dee"));
        obs.push(Observation::new(4, 2, WorkType(1), false, "eli"));
        HistoryTable::from_observations(obs, 0.01)
    }

    fn candidate(worker: &str) -> CandidateScore {
        CandidateScore {
            score: 1.0,
            record_index: 0,
            worker_id: worker.into(),
            work_day: 1,
            work_shift: 1,
            work_type: WorkType(0),
            worked: true,
            repetition_weight: 0.01,
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    }

    fn matcher() -> ShiftMatcher {
        ShiftMatcher::new(StaffingConfig::default(), WorkTypeVocabulary::default())
    }

    fn assert_within_limits(plan: &AssignmentPlan, config: &StaffingConfig) {
        for a in &plan.assignments {
            assert!(a.hours <= config.shift_hours + 1e-9);
        }
        let mut workers: Vec<&str> = plan
            .assignments
            .iter()
            .filter_map(|a| a.worker_id.as_deref())
            .collect();
        workers.dedup();
        for w in workers {
            let hours: f64 = plan.assignments_for_worker(w).iter().map(|a| a.hours).sum();
            assert!(hours <= config.week_hours + 1e-9);
        }
    }

    #[test]
    fn test_run_end_to_end() {
        init_tracing();
        let history = sample_history();
        let shifts = vec![
            OpenShift::new(1, 1, WorkType(0)),
            OpenShift::new(2, 2, WorkType(1)),
            OpenShift::new(6, 3, WorkType(2)),
        ];
        let m = matcher();
        let plan = m.run(&history, &shifts).unwrap();

        assert_eq!(plan.assignments.len(), 3);
        assert_eq!(plan.candidates.len(), 3);
        assert!(plan.summary.converged());
        assert_eq!(plan.assignments[0].shift_key, "1-1-0");
        for c in &plan.candidates {
            assert!(c.candidates.len() <= 3);
        }
        let filled_hours: f64 = plan.assignments.iter().map(|a| a.hours).sum();
        assert!((filled_hours - plan.summary.total_flow).abs() < 1e-9);
        assert_within_limits(&plan, m.config());
    }

    #[test]
    fn test_shared_worker_combined_flow() {
        let m = matcher();
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let s2 = OpenShift::new(2, 1, WorkType(0));
        let candidates = vec![
            ShiftCandidates::new(s1, vec![candidate("W1")]),
            ShiftCandidates::new(s2, vec![candidate("W1")]),
        ];
        let mut net = m.assemble(&candidates);
        let plan = m.solve(&mut net, candidates).unwrap();

        assert!((plan.summary.total_flow - 16.0).abs() < 1e-10);
        assert_eq!(plan.assignments_for_worker("W1").len(), 2);
        let trail = net.edge(&NodeId::worker("W1"), &NodeId::Sink).unwrap();
        assert!((trail.capacity - 40.0).abs() < 1e-10);
        assert!((trail.flow - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_weekly_cap_leaves_shift_unfilled() {
        let m = ShiftMatcher::new(
            StaffingConfig::default().with_week_hours(8.0),
            WorkTypeVocabulary::default(),
        );
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let s2 = OpenShift::new(2, 1, WorkType(0));
        let candidates = vec![
            ShiftCandidates::new(s1, vec![candidate("W1")]),
            ShiftCandidates::new(s2, vec![candidate("W1")]),
        ];
        let mut net = m.assemble(&candidates);
        let plan = m.solve(&mut net, candidates).unwrap();

        assert!((plan.summary.total_flow - 8.0).abs() < 1e-10);
        assert_eq!(plan.filled_count(), 1);
        assert_eq!(plan.unfilled().len(), 1);
    }

    #[test]
    fn test_empty_candidates_unfilled() {
        let m = matcher();
        let s1 = OpenShift::new(3, 2, WorkType(1));
        let candidates = vec![ShiftCandidates::new(s1, Vec::new())];
        let mut net = m.assemble(&candidates);
        let plan = m.solve(&mut net, candidates).unwrap();

        assert_eq!(plan.assignments, vec![Assignment::unfilled("3-2-1")]);
        assert_eq!(plan.summary.state, SolverState::Converged);
        assert_eq!(plan.lines(), vec!["3-2-1 unfilled 0".to_string()]);
    }

    #[test]
    fn test_blank_worker_candidate_skipped() {
        init_tracing();
        let m = matcher();
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let candidates = vec![ShiftCandidates::new(
            s1,
            vec![candidate(""), candidate("  "), candidate("W2")],
        )];
        let mut net = m.assemble(&candidates);
        // SOURCE, SINK, shift, W2
        assert_eq!(net.node_count(), 4);

        let plan = m.solve(&mut net, candidates).unwrap();
        assert_eq!(plan.assignments[0].worker_id.as_deref(), Some("W2"));
    }

    #[test]
    fn test_blank_worker_history_runs() {
        let mut obs: Vec<Observation> = sample_history()
            .records()
            .iter()
            .map(|r| {
                Observation::new(r.work_day, r.work_shift, r.work_type, r.worked, &r.worker_id)
            })
            .collect();
        obs.push(Observation::new(1, 1, WorkType(0), true, ""));
        let history = HistoryTable::from_observations(obs, 0.01);

        let plan = matcher()
            .run(&history, &[OpenShift::new(1, 1, WorkType(0))])
            .unwrap();
        assert_eq!(plan.assignments.len(), 1);
        assert!(plan.assignments_for_worker("").is_empty());
    }

    #[test]
    fn test_zero_candidate_limit_runs() {
        let m = ShiftMatcher::new(
            StaffingConfig::default().with_candidate_limit(0),
            WorkTypeVocabulary::default(),
        );
        let shifts = vec![OpenShift::new(1, 1, WorkType(0))];
        let plan = m.run(&sample_history(), &shifts).unwrap();
        assert_eq!(plan.filled_count(), 0);
        assert_eq!(plan.summary.total_flow, 0.0);
    }

    #[test]
    fn test_unknown_work_type_before_network() {
        let m = matcher();
        let shifts = vec![
            OpenShift::new(1, 1, WorkType(0)),
            OpenShift::new(1, 2, WorkType(99)),
        ];
        let err = m.build_network(&sample_history(), &shifts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, StaffingError::Validation(_)));
        assert!(m.run(&sample_history(), &shifts).is_err());
    }

    #[test]
    fn test_insufficient_history() {
        let m = matcher();
        let history = HistoryTable::from_observations(
            vec![Observation::new(1, 1, WorkType(0), true, "ana")],
            0.01,
        );
        let err = m
            .run(&history, &[OpenShift::new(1, 1, WorkType(0))])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_duplicate_candidates_collapse_to_one_edge() {
        let m = matcher();
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let candidates = vec![ShiftCandidates::new(
            s1,
            vec![candidate("W1"), candidate("W1"), candidate("W2")],
        )];
        let net = m.assemble(&candidates);
        let s = NodeId::shift(s1.shift_key());
        assert_eq!(net.outgoing(&s).count(), 2);
        // SOURCE, SINK, shift, W1, W2
        assert_eq!(net.node_count(), 5);
    }

    #[test]
    fn test_top_k_retention_run() {
        let m = ShiftMatcher::new(
            StaffingConfig::default()
                .with_retention(RetentionMode::TopK)
                .with_candidate_limit(2),
            WorkTypeVocabulary::default(),
        );
        let shifts = vec![OpenShift::new(1, 1, WorkType(0)), OpenShift::new(5, 2, WorkType(1))];
        let candidates = m.rank_candidates(&sample_history(), &shifts).unwrap();
        assert!(candidates.iter().all(|c| c.candidates.len() == 2));
    }

    #[test]
    fn test_readout_stable_across_calls() {
        let m = matcher();
        let history = sample_history();
        let shifts = vec![OpenShift::new(1, 1, WorkType(0)), OpenShift::new(2, 2, WorkType(1))];
        let (mut net, candidates) = m.build_network(&history, &shifts).unwrap();
        let plan = m.solve(&mut net, candidates).unwrap();
        assert_eq!(read_assignments(&net, &shifts), plan.assignments);
    }
}
