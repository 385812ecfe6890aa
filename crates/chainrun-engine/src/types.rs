//! Core types for the chain execution model.
//!
//! Every persisted type is `Serialize + Deserialize + Debug + Clone`. Map
//! fields use `BTreeMap`, never `HashMap`, so serialized output has a
//! deterministic key order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Chain definition
// ---------------------------------------------------------------------------

/// A persisted prompt chain: a directed graph of text-processing nodes.
///
/// The edge set must induce a DAG over node ids; a cycle is rejected at
/// validation time, before any node executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChainDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Insertion order is irrelevant to execution semantics, but it is the
    /// tie-break for the topological order, so it must be preserved.
    pub nodes: Vec<NodeDef>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// One step in a chain. `text` is a template that may contain `{{var}}`
/// placeholders resolved at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeDef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub text: String,
    /// Canvas coordinates. UI metadata only; the engine ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<(f64, f64)>,
}

/// The closed set of node kinds. Unrecognized strings deserialize to
/// [`NodeKind::Unknown`] and execute through the llm path, so a malformed
/// or future node type still produces an attempt rather than a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum NodeKind {
    /// Carries a value: output is the resolved template verbatim.
    Input,
    /// Sends the resolved template to the Text Generation Service.
    Llm,
    /// Reshapes text locally, no generation call.
    Transform,
    /// Formats the terminal artifact. Same substitution rule as Transform.
    Output,
    /// Reserved. Currently executes through the llm path.
    Merge,
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Whether execution of this kind calls the Text Generation Service.
    pub fn calls_generator(&self) -> bool {
        !matches!(self, Self::Input | Self::Transform | Self::Output)
    }
}

/// A directed dependency between two nodes: `target` consumes `source`'s
/// output as previous context. Both endpoints must name existing node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

// ---------------------------------------------------------------------------
// Execution context
// ---------------------------------------------------------------------------

/// Per-run execution state, owned exclusively by one run. Never shared
/// across concurrent runs of the same chain.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Initial input values supplied by the caller.
    pub variables: BTreeMap<String, String>,
    /// Outputs recorded per node id as nodes complete.
    pub outputs: BTreeMap<String, String>,
    /// Aggregated output of the current node's direct predecessors.
    /// Empty string means no context existed. Callers check length,
    /// never truthiness.
    pub previous_context: String,
}

// ---------------------------------------------------------------------------
// Execution results
// ---------------------------------------------------------------------------

/// One log entry per executed node, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NodeExecutionLog {
    pub node_id: String,
    /// Truncated template text, for display.
    pub node_name: String,
    pub kind: NodeKind,
    pub output: Option<String>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub had_previous_context: bool,
}

/// The outcome of a single run. [`ChainExecutor::run`] always produces one
/// of these; it never returns an error to the caller.
///
/// [`ChainExecutor::run`]: crate::executor::ChainExecutor::run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutionResult {
    pub run_id: Uuid,
    pub success: bool,
    pub logs: Vec<NodeExecutionLog>,
    pub final_output: Option<String>,
    pub total_time_ms: u64,
    pub nodes_executed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Retry configuration
// ---------------------------------------------------------------------------

/// Retry policy for Text Generation Service calls. Exponential backoff:
/// the delay before attempt `n+1` is `base_delay_ms * 2^(n-1)`.
///
/// Validation errors (bad edges, cycles, missing chain) are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts (1 = no retry). Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff in milliseconds. Default: 1 000.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1_000
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip<T: Serialize + for<'de> Deserialize<'de>>(val: &T) -> T {
        let s = serde_json::to_string(val).expect("serialize");
        serde_json::from_str(&s).expect("deserialize")
    }

    #[test]
    fn node_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(NodeKind::Input).unwrap(), json!("input"));
        assert_eq!(serde_json::to_value(NodeKind::Llm).unwrap(), json!("llm"));
        assert_eq!(
            serde_json::to_value(NodeKind::Transform).unwrap(),
            json!("transform")
        );
    }

    #[test]
    fn unknown_node_kind_deserializes() {
        let kind: NodeKind = serde_json::from_value(json!("hologram")).unwrap();
        assert_eq!(kind, NodeKind::Unknown);
        assert!(kind.calls_generator());
    }

    #[test]
    fn merge_and_unknown_call_generator() {
        assert!(NodeKind::Merge.calls_generator());
        assert!(NodeKind::Llm.calls_generator());
        assert!(!NodeKind::Input.calls_generator());
        assert!(!NodeKind::Transform.calls_generator());
        assert!(!NodeKind::Output.calls_generator());
    }

    #[test]
    fn node_def_uses_type_key() {
        let node: NodeDef = serde_json::from_value(json!({
            "id": "n1",
            "type": "llm",
            "text": "Summarize {{topic}}"
        }))
        .unwrap();
        assert_eq!(node.kind, NodeKind::Llm);
        assert!(node.position.is_none());
    }

    #[test]
    fn chain_def_round_trip() {
        let chain = ChainDef {
            id: "c1".into(),
            title: "Test".into(),
            description: String::new(),
            nodes: vec![NodeDef {
                id: "a".into(),
                kind: NodeKind::Input,
                text: "{{x}}".into(),
                position: Some((10.0, 20.0)),
            }],
            edges: vec![Edge {
                source: "a".into(),
                target: "a".into(),
            }],
            owner_id: None,
        };
        let rt = round_trip(&chain);
        assert_eq!(rt.id, chain.id);
        assert_eq!(rt.nodes.len(), 1);
        assert_eq!(rt.edges[0], chain.edges[0]);
    }

    #[test]
    fn retry_config_defaults() {
        let r = RetryConfig::default();
        assert_eq!(r.max_attempts, 3);
        assert_eq!(r.base_delay_ms, 1_000);
    }

    #[test]
    fn edge_display() {
        let e = Edge {
            source: "a".into(),
            target: "b".into(),
        };
        assert_eq!(e.to_string(), "a -> b");
    }
}
