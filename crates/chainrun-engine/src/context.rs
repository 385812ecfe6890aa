//! Aggregation of predecessor outputs into a node's previous context.

use std::collections::BTreeMap;

use crate::types::Edge;

/// Separator between predecessor outputs in the aggregated context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Gather the outputs of `node_id`'s direct predecessors into one text
/// block.
///
/// Walks every edge whose target is `node_id`, in edge order, and joins
/// the recorded source outputs with a blank line. Predecessors with no
/// recorded output (not yet executed, or recorded as empty) are skipped.
///
/// A node with no predecessors yields `""`. That is distinct from "context
/// exists but is empty": consumers must check `is_empty()`, not rely on a
/// separate flag.
pub fn gather_context(
    node_id: &str,
    edges: &[Edge],
    outputs: &BTreeMap<String, String>,
) -> String {
    let parts: Vec<&str> = edges
        .iter()
        .filter(|e| e.target == node_id)
        .filter_map(|e| outputs.get(&e.source).map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect();

    parts.join(CONTEXT_SEPARATOR)
}
