//! Capacitated flow network.
//!
//! A directed graph with two reserved nodes, SOURCE and SINK. Every edge
//! carries a capacity, a current flow and a residual (`capacity − flow`).
//! Nodes are only ever added; edges keep their insertion order, which fixes
//! the order in which searches and readouts visit them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::{Result, StaffingError};

/// Node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    /// Reserved flow origin.
    Source,
    /// Reserved flow destination.
    Sink,
    /// An open shift, keyed by its shift key.
    Shift(String),
    /// A candidate worker.
    Worker(String),
}

impl NodeId {
    /// Shift node.
    pub fn shift(key: impl Into<String>) -> Self {
        Self::Shift(key.into())
    }

    /// Worker node.
    pub fn worker(id: impl Into<String>) -> Self {
        Self::Worker(id.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "SOURCE"),
            Self::Sink => write!(f, "SINK"),
            Self::Shift(key) => write!(f, "shift:{key}"),
            Self::Worker(id) => write!(f, "worker:{id}"),
        }
    }
}

/// A directed edge stored on its origin node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlowEdge {
    pub(crate) to: usize,
    pub(crate) capacity: f64,
    pub(crate) flow: f64,
    pub(crate) residual: f64,
}

impl FlowEdge {
    /// Sets the flow and re-derives the residual.
    pub(crate) fn set_flow(&mut self, flow: f64) {
        self.flow = flow.clamp(0.0, self.capacity);
        self.residual = self.capacity - self.flow;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FlowNode {
    pub(crate) id: NodeId,
    pub(crate) edges: Vec<FlowEdge>,
    /// `(origin node, edge index on origin)` for every edge ending here.
    pub(crate) incoming: Vec<(usize, usize)>,
}

/// Read-only view of one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView<'a> {
    pub from: &'a NodeId,
    pub to: &'a NodeId,
    pub capacity: f64,
    pub flow: f64,
    pub residual: f64,
}

/// Directed capacitated graph with reserved SOURCE and SINK.
///
/// # Example
/// ```
/// use u_staffing::flow::{FlowNetwork, NodeId};
///
/// let mut net = FlowNetwork::new();
/// net.add_node(NodeId::shift("1-1-0"));
/// net.add_node(NodeId::worker("W1"));
/// net.add_leading_edge(&NodeId::shift("1-1-0"), 8.0).unwrap();
/// net.add_edge(&NodeId::shift("1-1-0"), &NodeId::worker("W1"), 8.0, false).unwrap();
/// net.add_trailing_edge(&NodeId::worker("W1"), 40.0).unwrap();
/// assert_eq!(net.node_count(), 4);
/// assert_eq!(net.edge_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    pub(crate) nodes: Vec<FlowNode>,
    index: HashMap<NodeId, usize>,
}

impl Default for FlowNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowNetwork {
    /// Creates a network holding only SOURCE and SINK.
    pub fn new() -> Self {
        let mut net = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        net.add_node(NodeId::Source);
        net.add_node(NodeId::Sink);
        net
    }

    /// Adds a node; no-op if it already exists.
    ///
    /// Returns `true` if the node was inserted.
    pub fn add_node(&mut self, id: NodeId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(FlowNode {
            id,
            edges: Vec::new(),
            incoming: Vec::new(),
        });
        true
    }

    /// Adds or updates the edge `from → to`.
    ///
    /// With `accumulate` the capacity is added to any existing capacity;
    /// otherwise it replaces it. The residual is recomputed either way.
    ///
    /// # Errors
    /// - `MissingNode` if either endpoint is absent.
    /// - `InvalidCapacity` if the capacity is negative, not finite, or the
    ///   resulting capacity would fall below the edge's current flow.
    pub fn add_edge(
        &mut self,
        from: &NodeId,
        to: &NodeId,
        capacity: f64,
        accumulate: bool,
    ) -> Result<()> {
        let invalid = |capacity: f64| StaffingError::InvalidCapacity {
            from: from.to_string(),
            to: to.to_string(),
            capacity,
        };
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(invalid(capacity));
        }
        let u = self.require(from)?;
        let v = self.require(to)?;

        if let Some(edge) = self.nodes[u].edges.iter_mut().find(|e| e.to == v) {
            let new_capacity = if accumulate {
                edge.capacity + capacity
            } else {
                if edge.capacity != capacity {
                    debug!(
                        %from,
                        %to,
                        prior = edge.capacity,
                        capacity,
                        "replacing edge capacity"
                    );
                }
                capacity
            };
            if new_capacity < edge.flow {
                return Err(invalid(new_capacity));
            }
            edge.capacity = new_capacity;
            edge.residual = new_capacity - edge.flow;
            return Ok(());
        }

        let edge_idx = self.nodes[u].edges.len();
        self.nodes[u].edges.push(FlowEdge {
            to: v,
            capacity,
            flow: 0.0,
            residual: capacity,
        });
        self.nodes[v].incoming.push((u, edge_idx));
        Ok(())
    }

    /// Adds intake capacity SOURCE → shift (accumulating).
    pub fn add_leading_edge(&mut self, shift: &NodeId, capacity: f64) -> Result<()> {
        self.add_edge(&NodeId::Source, shift, capacity, true)
    }

    /// Sets the capacity of worker → SINK (replacing).
    pub fn add_trailing_edge(&mut self, worker: &NodeId, capacity: f64) -> Result<()> {
        self.add_edge(worker, &NodeId::Sink, capacity, false)
    }

    /// Whether a node exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of nodes, SOURCE and SINK included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    /// The edge `from → to`, if present.
    pub fn edge(&self, from: &NodeId, to: &NodeId) -> Option<EdgeView<'_>> {
        let u = self.node_index(from)?;
        let v = self.node_index(to)?;
        self.nodes[u]
            .edges
            .iter()
            .find(|e| e.to == v)
            .map(|e| self.view(u, e))
    }

    /// Outgoing edges of a node in insertion order (empty if absent).
    pub fn outgoing<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = EdgeView<'a>> + 'a {
        let edges: &'a [FlowEdge] = match self.node_index(id) {
            Some(u) => &self.nodes[u].edges,
            None => &[],
        };
        let u = self.node_index(id).unwrap_or(0);
        edges.iter().map(move |e| self.view(u, e))
    }

    /// All edges, grouped by origin node in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(move |(u, n)| n.edges.iter().map(move |e| self.view(u, e)))
    }

    /// Total flow entering a node.
    pub fn inflow(&self, id: &NodeId) -> f64 {
        self.node_index(id).map_or(0.0, |v| {
            self.nodes[v]
                .incoming
                .iter()
                .map(|&(u, e)| self.nodes[u].edges[e].flow)
                .sum()
        })
    }

    /// Total flow leaving a node.
    pub fn outflow(&self, id: &NodeId) -> f64 {
        self.node_index(id)
            .map_or(0.0, |u| self.nodes[u].edges.iter().map(|e| e.flow).sum())
    }

    /// Flow leaving SOURCE.
    pub fn total_flow(&self) -> f64 {
        self.outflow(&NodeId::Source)
    }

    /// Clears all flow; capacities are kept.
    pub fn reset_flow(&mut self) {
        for node in &mut self.nodes {
            for edge in &mut node.edges {
                edge.set_flow(0.0);
            }
        }
    }

    pub(crate) fn node_index(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn require(&self, id: &NodeId) -> Result<usize> {
        self.node_index(id)
            .ok_or_else(|| StaffingError::MissingNode(id.to_string()))
    }

    fn view<'a>(&'a self, u: usize, e: &FlowEdge) -> EdgeView<'a> {
        EdgeView {
            from: &self.nodes[u].id,
            to: &self.nodes[e.to].id,
            capacity: e.capacity,
            flow: e.flow,
            residual: e.residual,
        }
    }
}

impl fmt::Display for FlowNetwork {
    /// One line per node: `id: target (flow/capacity), ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}:", node.id)?;
            for (i, e) in node.edges.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(
                    f,
                    "{sep}{} ({}/{})",
                    self.nodes[e.to].id, e.flow, e.capacity
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(k: &str) -> NodeId {
        NodeId::shift(k)
    }

    fn worker(k: &str) -> NodeId {
        NodeId::worker(k)
    }

    #[test]
    fn test_reserved_nodes() {
        let net = FlowNetwork::new();
        assert!(net.contains(&NodeId::Source));
        assert!(net.contains(&NodeId::Sink));
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_add_node_idempotent() {
        let mut net = FlowNetwork::new();
        assert!(net.add_node(shift("S1")));
        assert!(!net.add_node(shift("S1")));
        assert_eq!(net.node_count(), 3);
        // Same key in a different role is a different node.
        assert!(net.add_node(worker("S1")));
    }

    #[test]
    fn test_missing_endpoint() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        let err = net
            .add_edge(&shift("S1"), &worker("W1"), 8.0, false)
            .unwrap_err();
        assert_eq!(err, StaffingError::MissingNode("worker:W1".into()));
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_replace_and_accumulate() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        net.add_node(worker("W1"));

        net.add_edge(&shift("S1"), &worker("W1"), 8.0, false)
            .unwrap();
        net.add_edge(&shift("S1"), &worker("W1"), 6.0, false)
            .unwrap();
        let e = net.edge(&shift("S1"), &worker("W1")).unwrap();
        assert!((e.capacity - 6.0).abs() < 1e-10);
        assert!((e.residual - 6.0).abs() < 1e-10);

        net.add_edge(&shift("S1"), &worker("W1"), 4.0, true)
            .unwrap();
        let e = net.edge(&shift("S1"), &worker("W1")).unwrap();
        assert!((e.capacity - 10.0).abs() < 1e-10);
        assert!((e.residual - 10.0).abs() < 1e-10);
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn test_leading_accumulates_trailing_replaces() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        net.add_node(worker("W1"));

        net.add_leading_edge(&shift("S1"), 8.0).unwrap();
        net.add_leading_edge(&shift("S1"), 8.0).unwrap();
        net.add_trailing_edge(&worker("W1"), 40.0).unwrap();
        net.add_trailing_edge(&worker("W1"), 40.0).unwrap();

        let lead = net.edge(&NodeId::Source, &shift("S1")).unwrap();
        assert!((lead.capacity - 16.0).abs() < 1e-10);
        let trail = net.edge(&worker("W1"), &NodeId::Sink).unwrap();
        assert!((trail.capacity - 40.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_capacity() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        assert!(matches!(
            net.add_leading_edge(&shift("S1"), -1.0),
            Err(StaffingError::InvalidCapacity { .. })
        ));
        assert!(net.add_leading_edge(&shift("S1"), f64::NAN).is_err());
    }

    #[test]
    fn test_capacity_below_flow_rejected() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        net.add_leading_edge(&shift("S1"), 8.0).unwrap();
        let u = net.node_index(&NodeId::Source).unwrap();
        net.nodes[u].edges[0].set_flow(5.0);

        assert!(net
            .add_edge(&NodeId::Source, &shift("S1"), 4.0, false)
            .is_err());
        net.add_edge(&NodeId::Source, &shift("S1"), 6.0, false)
            .unwrap();
        let e = net.edge(&NodeId::Source, &shift("S1")).unwrap();
        assert!((e.residual - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_outgoing_order_and_flows() {
        let mut net = FlowNetwork::new();
        for id in [shift("S1"), worker("W2"), worker("W1")] {
            net.add_node(id);
        }
        net.add_edge(&shift("S1"), &worker("W2"), 8.0, false)
            .unwrap();
        net.add_edge(&shift("S1"), &worker("W1"), 8.0, false)
            .unwrap();

        let targets: Vec<_> = net.outgoing(&shift("S1")).map(|e| e.to.clone()).collect();
        assert_eq!(targets, vec![worker("W2"), worker("W1")]);
        assert_eq!(net.outgoing(&shift("missing")).count(), 0);
        assert!((net.outflow(&shift("S1")) - 0.0).abs() < 1e-10);
        assert!((net.inflow(&worker("W1")) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_display_dump() {
        let mut net = FlowNetwork::new();
        net.add_node(shift("S1"));
        net.add_leading_edge(&shift("S1"), 8.0).unwrap();
        let dump = net.to_string();
        assert!(dump.starts_with("SOURCE: shift:S1 (0/8)\n"));
        assert!(dump.contains("SINK:\n"));
    }
}
