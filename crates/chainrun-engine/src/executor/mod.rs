//! Chain orchestration: fetch, validate, order, execute, report.

pub mod node;
pub mod order;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::context::gather_context;
use crate::errors::RunError;
use crate::traits::{ChainStore, TextGenerator};
use crate::types::{
    ChainDef, ExecutionResult, NodeDef, NodeExecutionLog, RetryConfig, RunContext,
};

pub use node::{execute_node, generate_with_retry, NodeOutcome};
pub use order::{execution_order, validate_edges};

/// Maximum characters of template text used as a node's display name.
const NODE_NAME_MAX_CHARS: usize = 60;

/// Runs prompt chains end to end.
///
/// Holds its collaborators behind trait objects, so a production store and
/// generator or in-memory test doubles wire up the same way. Cheap to
/// clone; safe to share across tasks.
#[derive(Clone)]
pub struct ChainExecutor {
    store: Arc<dyn ChainStore>,
    generator: Arc<dyn TextGenerator>,
    retry: RetryConfig,
}

impl ChainExecutor {
    pub fn new(store: Arc<dyn ChainStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            retry: RetryConfig::default(),
        }
    }

    /// Replace the default retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Execute the chain `chain_id` with the caller's input values.
    ///
    /// Total: every failure mode, from a missing chain to a node error
    /// after retries, is reported inside the returned [`ExecutionResult`]
    /// with `success == false`. The caller never sees an `Err` or a panic.
    pub async fn run(
        &self,
        chain_id: &str,
        input_values: BTreeMap<String, String>,
    ) -> ExecutionResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = std::time::Instant::now();

        tracing::info!(%run_id, chain_id, "chain run started");

        let mut result = match self.run_inner(run_id, chain_id, input_values).await {
            Ok(result) => result,
            Err(err) => ExecutionResult {
                run_id,
                success: false,
                logs: Vec::new(),
                final_output: None,
                total_time_ms: 0,
                nodes_executed: 0,
                error: Some(err.to_string()),
                started_at,
                finished_at: started_at,
            },
        };

        result.started_at = started_at;
        result.finished_at = Utc::now();
        result.total_time_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            %run_id,
            chain_id,
            success = result.success,
            nodes_executed = result.nodes_executed,
            total_time_ms = result.total_time_ms,
            "chain run finished"
        );

        result
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        chain_id: &str,
        input_values: BTreeMap<String, String>,
    ) -> Result<ExecutionResult, RunError> {
        let chain = self
            .store
            .get_chain(chain_id)
            .await
            .map_err(|e| RunError::Store {
                message: e.to_string(),
            })?
            .ok_or_else(|| RunError::ChainNotFound {
                id: chain_id.to_string(),
            })?;

        if chain.nodes.is_empty() {
            return Err(RunError::EmptyChain);
        }

        validate_edges(&chain.nodes, &chain.edges)?;
        let order = execution_order(&chain.nodes, &chain.edges)?;

        Ok(self.execute_ordered(run_id, &chain, &order, input_values).await)
    }

    /// Walk the ordered nodes. Halts at the first node error, keeping the
    /// logs accumulated so far.
    async fn execute_ordered(
        &self,
        run_id: Uuid,
        chain: &ChainDef,
        order: &[usize],
        input_values: BTreeMap<String, String>,
    ) -> ExecutionResult {
        let now = Utc::now();
        let mut ctx = RunContext {
            variables: input_values,
            outputs: BTreeMap::new(),
            previous_context: String::new(),
        };
        let mut logs: Vec<NodeExecutionLog> = Vec::with_capacity(order.len());

        for &idx in order {
            let node = &chain.nodes[idx];
            ctx.previous_context = gather_context(&node.id, &chain.edges, &ctx.outputs);
            let had_previous_context = !ctx.previous_context.is_empty();

            tracing::debug!(
                %run_id,
                node_id = %node.id,
                kind = ?node.kind,
                had_previous_context,
                "executing node"
            );

            let outcome = execute_node(node, &ctx, &self.generator, &self.retry).await;

            ctx.outputs.insert(
                node.id.clone(),
                outcome.output.clone().unwrap_or_default(),
            );

            let failed = outcome.error.is_some();
            logs.push(NodeExecutionLog {
                node_id: node.id.clone(),
                node_name: node_name(node),
                kind: node.kind,
                output: outcome.output,
                error: outcome.error,
                execution_time_ms: outcome.execution_time_ms,
                had_previous_context,
            });

            if failed {
                tracing::warn!(%run_id, node_id = %node.id, "node failed, halting chain");
                return ExecutionResult {
                    run_id,
                    success: false,
                    nodes_executed: logs.len(),
                    final_output: None,
                    total_time_ms: 0,
                    error: logs
                        .last()
                        .and_then(|l| l.error.clone())
                        .map(|e| format!("node {} failed: {e}", node.id)),
                    logs,
                    started_at: now,
                    finished_at: now,
                };
            }
        }

        // The last node in topological order owns the final output.
        let final_output = order
            .last()
            .map(|&idx| chain.nodes[idx].id.as_str())
            .and_then(|id| ctx.outputs.get(id).cloned());

        ExecutionResult {
            run_id,
            success: true,
            nodes_executed: logs.len(),
            final_output,
            total_time_ms: 0,
            error: None,
            logs,
            started_at: now,
            finished_at: now,
        }
    }
}

/// Display name for a node: its template text truncated to a character
/// limit, never splitting a code point.
fn node_name(node: &NodeDef) -> String {
    if node.text.chars().count() <= NODE_NAME_MAX_CHARS {
        node.text.clone()
    } else {
        node.text.chars().take(NODE_NAME_MAX_CHARS).collect()
    }
}
