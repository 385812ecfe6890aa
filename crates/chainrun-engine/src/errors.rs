//! Error types for the chain execution engine.

use thiserror::Error;

use crate::types::Edge;

/// Errors raised while fetching, validating, or ordering a chain. All of
/// them are caught at the [`ChainExecutor::run`] boundary and normalized
/// into a failed [`ExecutionResult`]; none escape to the caller.
///
/// [`ChainExecutor::run`]: crate::executor::ChainExecutor::run
/// [`ExecutionResult`]: crate::types::ExecutionResult
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    #[error("chain not found: {id}")]
    ChainNotFound { id: String },
    #[error("chain has no nodes")]
    EmptyChain,
    /// One or more edges reference a node id that does not exist in the
    /// chain. All violations are collected before failing.
    #[error("invalid edges: {}", format_edges(.edges))]
    InvalidEdge { edges: Vec<Edge> },
    /// The edge set contains a cycle, or a subgraph unreachable from the
    /// zero-in-degree seed set.
    #[error("cycle detected in chain graph")]
    CycleDetected,
    #[error("chain store error: {message}")]
    Store { message: String },
}

fn format_edges(edges: &[Edge]) -> String {
    edges
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from [`TextGenerator`](crate::traits::TextGenerator)
/// implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("text generation failed: {message}")]
    Provider { message: String },
    #[error("malformed generation response: {message}")]
    InvalidResponse { message: String },
}

/// Errors from [`ChainStore`](crate::traits::ChainStore) implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainStoreError {
    #[error("chain store error: {message}")]
    Store { message: String },
}
