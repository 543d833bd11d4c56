//! Assignment readout from a solved network.

use std::collections::HashMap;

use super::network::{FlowNetwork, NodeId};
use super::solver::FLOW_EPSILON;
use crate::models::{Assignment, OpenShift};

/// Positive-flow shift → worker edges of a shift, in insertion order.
pub fn shift_allocations(network: &FlowNetwork, shift_key: &str) -> Vec<(String, f64)> {
    network
        .outgoing(&NodeId::shift(shift_key))
        .filter(|e| e.flow > FLOW_EPSILON)
        .filter_map(|e| match e.to {
            NodeId::Worker(id) => Some((id.clone(), e.flow)),
            _ => None,
        })
        .collect()
}

/// One assignment per open shift, in input order.
///
/// The first positive-flow outgoing edge of a shift names its worker and
/// the edge's flow is the hours. A shift key that occurs several times
/// takes its n-th positive-flow edge on its n-th occurrence. Shifts
/// without one are unfilled.
///
/// Reads only; calling it twice on the same network gives the same result.
pub fn read_assignments(network: &FlowNetwork, shifts: &[OpenShift]) -> Vec<Assignment> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut cache: HashMap<String, Vec<(String, f64)>> = HashMap::new();

    shifts
        .iter()
        .map(|shift| {
            let key = shift.shift_key();
            let nth = occurrences.entry(key.clone()).or_insert(0);
            let allocations = cache
                .entry(key.clone())
                .or_insert_with(|| shift_allocations(network, &key));

            let assignment = match allocations.get(*nth) {
                Some((worker, hours)) => Assignment::filled(key, worker.clone(), *hours),
                None => Assignment::unfilled(key),
            };
            *nth += 1;
            assignment
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::MaxFlowSolver;
    use crate::models::WorkType;

    fn solved(pairs: &[(&OpenShift, &str)]) -> FlowNetwork {
        let mut net = FlowNetwork::new();
        for &(shift, w) in pairs {
            let s = NodeId::shift(shift.shift_key());
            let w = NodeId::worker(w);
            net.add_node(s.clone());
            net.add_node(w.clone());
            net.add_leading_edge(&s, 8.0).unwrap();
            net.add_edge(&s, &w, 8.0, false).unwrap();
            net.add_trailing_edge(&w, 40.0).unwrap();
        }
        MaxFlowSolver::default().solve(&mut net).unwrap();
        net
    }

    #[test]
    fn test_readout_filled_and_unfilled() {
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let s2 = OpenShift::new(1, 2, WorkType(0));
        let mut net = solved(&[(&s1, "W1")]);
        net.add_node(NodeId::shift(s2.shift_key()));

        let out = read_assignments(&net, &[s1, s2]);
        assert_eq!(out[0], Assignment::filled("1-1-0", "W1", 8.0));
        assert_eq!(out[1], Assignment::unfilled("1-2-0"));
    }

    #[test]
    fn test_readout_shift_absent_from_network() {
        let net = FlowNetwork::new();
        let out = read_assignments(&net, &[OpenShift::new(2, 1, WorkType(1))]);
        assert!(!out[0].is_filled());
    }

    #[test]
    fn test_readout_idempotent() {
        let s1 = OpenShift::new(1, 1, WorkType(0));
        let s2 = OpenShift::new(2, 1, WorkType(0));
        let net = solved(&[(&s1, "W1"), (&s2, "W2")]);
        let first = read_assignments(&net, &[s1, s2]);
        let second = read_assignments(&net, &[s1, s2]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_shift_keys_take_successive_edges() {
        // Same shift twice: intake accumulates to 16 and two workers share it.
        let s = OpenShift::new(3, 1, WorkType(1));
        let net = solved(&[(&s, "W1"), (&s, "W2")]);
        let out = read_assignments(&net, &[s, s]);
        assert_eq!(out[0].worker_id.as_deref(), Some("W1"));
        assert_eq!(out[1].worker_id.as_deref(), Some("W2"));
        assert_eq!(shift_allocations(&net, &s.shift_key()).len(), 2);
    }
}
