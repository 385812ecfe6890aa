//! Edge validation and deterministic topological ordering.

use std::collections::{HashMap, VecDeque};

use crate::errors::RunError;
use crate::types::{Edge, NodeDef};

/// Check that every edge endpoint names an existing node id.
///
/// Collects ALL violations before failing, so a caller gets the complete
/// diagnostic in one pass rather than one edge per attempt.
pub fn validate_edges(nodes: &[NodeDef], edges: &[Edge]) -> Result<(), RunError> {
    let known: HashMap<&str, ()> = nodes.iter().map(|n| (n.id.as_str(), ())).collect();

    let invalid: Vec<Edge> = edges
        .iter()
        .filter(|e| !known.contains_key(e.source.as_str()) || !known.contains_key(e.target.as_str()))
        .cloned()
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(RunError::InvalidEdge { edges: invalid })
    }
}

/// Compute a topological order over `nodes` using Kahn's algorithm.
///
/// Returns indices into `nodes`. The ready queue is seeded and extended in
/// node-array order, so ties between nodes that become ready at the same
/// time always break toward the earlier array position. Identical input
/// yields an identical order.
///
/// If the ordered list comes up short of the node count, the remainder sits
/// on a cycle (or hangs off one) and can never reach in-degree zero.
/// That is [`RunError::CycleDetected`].
///
/// Callers must run [`validate_edges`] first; edges naming unknown ids are
/// ignored here.
pub fn execution_order(nodes: &[NodeDef], edges: &[Edge]) -> Result<Vec<usize>, RunError> {
    let index_of: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for edge in edges {
        let (Some(&src), Some(&dst)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) else {
            continue;
        };
        successors[src].push(dst);
        in_degree[dst] += 1;
    }

    let mut ready: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_front() {
        ordered.push(i);
        for &succ in &successors[i] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.push_back(succ);
            }
        }
    }

    if ordered.len() < nodes.len() {
        return Err(RunError::CycleDetected);
    }

    Ok(ordered)
}
