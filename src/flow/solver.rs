//! Maximum-flow solver (Edmonds–Karp / Ford–Fulkerson).
//!
//! # Algorithm
//!
//! The solver alternates two states until no augmenting path remains:
//!
//! - **Searching**: find a SOURCE → SINK path in the residual graph. A
//!   forward step along `u → v` needs `residual > 0`; a backward step
//!   `v → u` needs flow on `u → v` (pushing flow back undoes an earlier,
//!   worse routing). The bottleneck is the smallest residual on the path.
//! - **Augmenting**: push the bottleneck along the path (forward edges gain
//!   flow, backward edges lose it) and recompute each residual.
//!
//! With [`PathSearch::BreadthFirst`] the path is a shortest one and the
//! run is Edmonds–Karp, O(V·E²). [`PathSearch::DepthFirst`] pops the most
//! recently discovered node first; the result is the same maximum flow,
//! but only the generic Ford–Fulkerson bound (total capacity) holds.
//!
//! # Reference
//! Edmonds & Karp (1972), "Theoretical Improvements in Algorithmic
//! Efficiency for Network Flow Problems"; Cormen et al. (2009), Ch. 26.2

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

use super::network::{FlowNetwork, NodeId};
use crate::config::{PathSearch, StaffingConfig};
use crate::error::{Result, StaffingError};

/// Residuals and flows at or below this are treated as zero.
pub const FLOW_EPSILON: f64 = 1e-9;

/// Solver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState {
    /// Looking for an augmenting path.
    Searching,
    /// Pushing flow along a found path.
    Augmenting,
    /// No augmenting path remains; the flow is maximal.
    Converged,
    /// Stopped by the iteration cap before convergence.
    Halted,
}

/// Outcome of a max-flow run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Flow leaving the source after the run.
    pub total_flow: f64,
    /// Number of augmenting steps performed.
    pub augmentations: usize,
    /// Terminal state: `Converged` or `Halted`.
    pub state: SolverState,
}

impl FlowSummary {
    /// Whether the run reached a maximum flow.
    pub fn converged(&self) -> bool {
        self.state == SolverState::Converged
    }
}

/// One step of an augmenting path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    /// Node owning the edge.
    owner: usize,
    /// Edge index on the owner.
    edge: usize,
    /// Traversed along (`true`) or against (`false`) its direction.
    forward: bool,
}

/// A residual path from source to sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentingPath {
    steps: Vec<Step>,
    /// Smallest residual along the path.
    pub bottleneck: f64,
}

impl AugmentingPath {
    /// Number of edges on the path.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no edges.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Node ids visited, source first.
    pub fn nodes<'a>(&self, network: &'a FlowNetwork) -> Vec<&'a NodeId> {
        let mut out = Vec::with_capacity(self.steps.len() + 1);
        for (i, s) in self.steps.iter().enumerate() {
            let target = network.nodes[s.owner].edges[s.edge].to;
            let (prev, next) = if s.forward {
                (s.owner, target)
            } else {
                (target, s.owner)
            };
            if i == 0 {
                out.push(&network.nodes[prev].id);
            }
            out.push(&network.nodes[next].id);
        }
        out
    }
}

/// Max-flow solver over a [`FlowNetwork`].
///
/// # Example
/// ```
/// use u_staffing::config::PathSearch;
/// use u_staffing::flow::{FlowNetwork, MaxFlowSolver, NodeId};
///
/// let (s1, w1) = (NodeId::shift("S1"), NodeId::worker("W1"));
/// let mut net = FlowNetwork::new();
/// net.add_node(s1.clone());
/// net.add_node(w1.clone());
/// net.add_leading_edge(&s1, 8.0).unwrap();
/// net.add_edge(&s1, &w1, 8.0, false).unwrap();
/// net.add_trailing_edge(&w1, 40.0).unwrap();
///
/// let summary = MaxFlowSolver::new(PathSearch::BreadthFirst).solve(&mut net).unwrap();
/// assert!(summary.converged());
/// assert_eq!(summary.total_flow, 8.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MaxFlowSolver {
    search: PathSearch,
    max_iterations: Option<usize>,
}

impl MaxFlowSolver {
    /// Creates a solver with the given search order.
    pub fn new(search: PathSearch) -> Self {
        Self {
            search,
            max_iterations: None,
        }
    }

    /// Creates a solver from the run configuration.
    pub fn from_config(config: &StaffingConfig) -> Self {
        Self {
            search: config.path_search,
            max_iterations: config.max_iterations,
        }
    }

    /// Caps the number of augmenting steps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Search order in use.
    pub fn search(&self) -> PathSearch {
        self.search
    }

    /// Maximum flow from SOURCE to SINK.
    pub fn solve(&self, network: &mut FlowNetwork) -> Result<FlowSummary> {
        self.solve_between(network, &NodeId::Source, &NodeId::Sink)
    }

    /// Maximum flow between two arbitrary nodes.
    ///
    /// # Errors
    /// `MissingNode` if either endpoint is absent, `InvalidConfig` if they
    /// are the same node. Both are checked before any flow moves.
    pub fn solve_between(
        &self,
        network: &mut FlowNetwork,
        source: &NodeId,
        sink: &NodeId,
    ) -> Result<FlowSummary> {
        let (s, t) = endpoints(network, source, sink)?;

        let mut state = SolverState::Searching;
        let mut augmentations = 0usize;
        let mut pending: Option<AugmentingPath> = None;

        loop {
            match state {
                SolverState::Searching => {
                    if self.max_iterations.is_some_and(|cap| augmentations >= cap) {
                        state = SolverState::Halted;
                        continue;
                    }
                    pending = self.search_path(network, s, t);
                    state = if pending.is_some() {
                        SolverState::Augmenting
                    } else {
                        SolverState::Converged
                    };
                }
                SolverState::Augmenting => {
                    if let Some(path) = pending.take() {
                        trace!(
                            step = augmentations,
                            bottleneck = path.bottleneck,
                            path = ?path.nodes(network),
                            "augmenting"
                        );
                        augment(network, &path);
                        augmentations += 1;
                    }
                    state = SolverState::Searching;
                }
                SolverState::Converged | SolverState::Halted => break,
            }
        }

        let total_flow = network.outflow(source) - network.inflow(source);
        if state == SolverState::Halted {
            warn!(
                augmentations,
                total_flow, "max-flow halted by iteration cap before convergence"
            );
        } else {
            debug!(augmentations, total_flow, search = ?self.search, "max-flow converged");
        }

        Ok(FlowSummary {
            total_flow,
            augmentations,
            state,
        })
    }

    /// Finds one augmenting path without modifying the network.
    pub fn find_path(
        &self,
        network: &FlowNetwork,
        source: &NodeId,
        sink: &NodeId,
    ) -> Result<Option<AugmentingPath>> {
        let (s, t) = endpoints(network, source, sink)?;
        Ok(self.search_path(network, s, t))
    }

    fn search_path(&self, network: &FlowNetwork, s: usize, t: usize) -> Option<AugmentingPath> {
        let n = network.nodes.len();
        let mut visited = vec![false; n];
        let mut parent: Vec<Option<Step>> = vec![None; n];
        let mut frontier = VecDeque::new();

        visited[s] = true;
        frontier.push_back(s);

        'search: while let Some(u) = match self.search {
            PathSearch::BreadthFirst => frontier.pop_front(),
            PathSearch::DepthFirst => frontier.pop_back(),
        } {
            let node = &network.nodes[u];

            for (ei, e) in node.edges.iter().enumerate() {
                if e.residual > FLOW_EPSILON && !visited[e.to] {
                    visited[e.to] = true;
                    parent[e.to] = Some(Step {
                        owner: u,
                        edge: ei,
                        forward: true,
                    });
                    if e.to == t {
                        break 'search;
                    }
                    frontier.push_back(e.to);
                }
            }

            for &(v, ei) in &node.incoming {
                if network.nodes[v].edges[ei].flow > FLOW_EPSILON && !visited[v] {
                    visited[v] = true;
                    parent[v] = Some(Step {
                        owner: v,
                        edge: ei,
                        forward: false,
                    });
                    frontier.push_back(v);
                }
            }
        }

        if !visited[t] {
            return None;
        }

        let mut steps = Vec::new();
        let mut bottleneck = f64::INFINITY;
        let mut at = t;
        while at != s {
            let step = parent[at]?;
            let edge = &network.nodes[step.owner].edges[step.edge];
            let (prev, available) = if step.forward {
                (step.owner, edge.residual)
            } else {
                (edge.to, edge.flow)
            };
            bottleneck = bottleneck.min(available);
            steps.push(step);
            at = prev;
        }
        steps.reverse();

        Some(AugmentingPath { steps, bottleneck })
    }
}

fn endpoints(network: &FlowNetwork, source: &NodeId, sink: &NodeId) -> Result<(usize, usize)> {
    let s = network
        .node_index(source)
        .ok_or_else(|| StaffingError::MissingNode(source.to_string()))?;
    let t = network
        .node_index(sink)
        .ok_or_else(|| StaffingError::MissingNode(sink.to_string()))?;
    if s == t {
        return Err(StaffingError::InvalidConfig(format!(
            "source and sink are the same node ({source})"
        )));
    }
    Ok((s, t))
}

fn augment(network: &mut FlowNetwork, path: &AugmentingPath) {
    for step in &path.steps {
        let edge = &mut network.nodes[step.owner].edges[step.edge];
        let flow = if step.forward {
            edge.flow + path.bottleneck
        } else {
            edge.flow - path.bottleneck
        };
        edge.set_flow(flow);
    }
}
